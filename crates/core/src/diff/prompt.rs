use crate::github::RepoContext;

/// System instruction for the generation pass.
pub const GENERATE_PREAMBLE: &str = "\
You are a code assistant that produces unified diffs. Given a GitHub repo's file contents and a \
user prompt, you must output ONLY a valid unified diff (e.g. starting with \"diff --git ...\") \
that implements the requested change. Do not output any explanation, markdown, or text before \
or after the diff. Output the complete diff only.";

/// System instruction for the review pass.
pub const REFLECT_PREAMBLE: &str = "\
You are a reviewer. You will see: (1) the user's original request, (2) a unified diff that was \
generated to fulfill it. Your job is to decide if the diff is correct and complete, or if it \
should be corrected.

If the diff is correct and fully addresses the request, respond with exactly: CORRECT

If the diff has mistakes, is incomplete, or does not match the request, respond with: CORRECTED
Then on the next lines, output a replacement unified diff that fixes the issues. Output only \
CORRECT or CORRECTED followed by the new diff when applicable. No other text.";

/// Render the repository as a single block of text for the model.
///
/// One header line naming the repository and branch, then one fenced section
/// per file in collection order.
pub fn format_repo_context(context: &RepoContext) -> String {
    let mut lines = vec![format!(
        "# Repo: {}/{} (branch: {})\n",
        context.owner, context.repo, context.default_branch
    )];

    for file in &context.files {
        lines.push(format!(
            "\n## File: {}\n```\n{}\n```",
            file.path, file.content
        ));
    }

    lines.join("\n")
}

/// Build the user message for the generation pass.
pub fn build_generate_prompt(repo_text: &str, prompt: &str, feedback: Option<&str>) -> String {
    let mut message = format!("Repo contents:\n{repo_text}\n\nUser request:\n{prompt}");

    if let Some(feedback) = feedback.filter(|f| !f.trim().is_empty()) {
        message.push_str(&format!("\n\nReflection/correction request:\n{feedback}"));
    }

    message
}

/// Build the user message for the review pass.
pub fn build_reflect_prompt(prompt: &str, diff: &str) -> String {
    format!("User request:\n{prompt}\n\nGenerated diff:\n{diff}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::FileContent;

    fn context(files: Vec<(&str, &str)>) -> RepoContext {
        RepoContext {
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            default_branch: "main".to_string(),
            files: files
                .into_iter()
                .map(|(path, content)| FileContent {
                    path: path.to_string(),
                    content: content.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_format_empty_repo() {
        assert_eq!(
            format_repo_context(&context(vec![])),
            "# Repo: octo/hello (branch: main)\n"
        );
    }

    #[test]
    fn test_format_files_in_order() {
        let text = format_repo_context(&context(vec![
            ("src/main.rs", "fn main() {}"),
            ("Cargo.toml", "[package]"),
        ]));

        assert_eq!(
            text,
            "# Repo: octo/hello (branch: main)\n\n\n## File: src/main.rs\n```\nfn main() {}\n```\n\n## File: Cargo.toml\n```\n[package]\n```"
        );
        assert!(text.find("src/main.rs").unwrap() < text.find("Cargo.toml").unwrap());
    }

    #[test]
    fn test_format_is_deterministic() {
        let ctx = context(vec![("a.txt", "a"), ("b.txt", "b")]);
        assert_eq!(format_repo_context(&ctx), format_repo_context(&ctx));
    }

    #[test]
    fn test_generate_prompt_without_feedback() {
        assert_eq!(
            build_generate_prompt("REPO", "Add a flag", None),
            "Repo contents:\nREPO\n\nUser request:\nAdd a flag"
        );
        assert_eq!(
            build_generate_prompt("REPO", "Add a flag", Some("  ")),
            "Repo contents:\nREPO\n\nUser request:\nAdd a flag"
        );
    }

    #[test]
    fn test_generate_prompt_with_feedback() {
        let message = build_generate_prompt("REPO", "Add a flag", Some("Also update docs"));
        assert!(message.ends_with("\n\nReflection/correction request:\nAlso update docs"));
    }

    #[test]
    fn test_reflect_prompt() {
        assert_eq!(
            build_reflect_prompt("Fix typo", "diff --git a/x b/x"),
            "User request:\nFix typo\n\nGenerated diff:\ndiff --git a/x b/x"
        );
    }
}
