//! Editor resolution.
//!
//! Grounded on `client/base.py`'s editor-selection loop: try each candidate
//! in order, `shlex`-split it, verify the leading token resolves to an
//! executable on `PATH`, and print a one-line notice (suppressible via
//! `advice.macheteEditorSelection=false`) unless the candidate came from
//! `GIT_MACHETE_EDITOR` itself.

use crate::git::Repository;

const GIT_MACHETE_EDITOR_VAR: &str = "GIT_MACHETE_EDITOR";

/// Resolve the editor command line to invoke for the branch-layout file or
/// a rebase TODO list. Returns the argv (program + args).
pub fn resolve_editor(repo: &Repository) -> anyhow::Result<Vec<String>> {
    let candidates: Vec<(&str, Option<String>)> = vec![
        (GIT_MACHETE_EDITOR_VAR, std::env::var(GIT_MACHETE_EDITOR_VAR).ok()),
        ("$GIT_EDITOR", std::env::var("GIT_EDITOR").ok()),
        ("git config core.editor", repo.config_get("core.editor")?),
        ("$VISUAL", std::env::var("VISUAL").ok()),
        ("$EDITOR", std::env::var("EDITOR").ok()),
        ("editor", Some("editor".to_string())),
        ("nano", Some("nano".to_string())),
        ("vi", Some("vi".to_string())),
    ];

    for (name, value) in candidates {
        let Some(editor) = value else {
            log::debug!("'{name}' is undefined");
            continue;
        };
        let parsed = shell_words(&editor);
        let Some(program) = parsed.first() else {
            log::debug!("'{name}' shlexes into an empty list");
            continue;
        };

        if which::which(program).is_err() {
            log::debug!("'{program}' executable ('{name}') not found");
            if name == GIT_MACHETE_EDITOR_VAR {
                anyhow::bail!("'{name}' ({editor}) is not available");
            }
            continue;
        }

        if name != GIT_MACHETE_EDITOR_VAR && repo.config_get("advice.macheteEditorSelection")?.as_deref() != Some("false") {
            let sample_alternative = if program.starts_with("vi") { "nano" } else { "vi" };
            eprintln!(
                "Opening '{name}'{}.\nTo override this choice, use {GIT_MACHETE_EDITOR_VAR} env var, e.g. `export {GIT_MACHETE_EDITOR_VAR}={sample_alternative}`.\nUse `git config --global advice.macheteEditorSelection false` to suppress this message.",
                if program != name { format!(" ({editor})") } else { String::new() }
            );
        }
        return Ok(parsed);
    }

    anyhow::bail!("no usable editor found")
}

/// Minimal shell-word splitter (quote-and-escape aware), standing in for
/// Python's `shlex.split` since there's no stdlib equivalent.
fn shell_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                for c2 in chars.by_ref() {
                    if c2 == '\'' {
                        break;
                    }
                    current.push(c2);
                }
            }
            '"' => {
                in_word = true;
                for c2 in chars.by_ref() {
                    if c2 == '"' {
                        break;
                    }
                    current.push(c2);
                }
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_words() {
        assert_eq!(shell_words("vim -n"), vec!["vim", "-n"]);
    }

    #[test]
    fn handles_quoted_segments() {
        assert_eq!(shell_words("\"code --wait\""), vec!["code --wait"]);
    }
}
