//! Operator prompts
//!
//! On a terminal the prompts go through dialoguer on stderr. With piped
//! stdin, answers are read line by line so batch sessions can be scripted;
//! end of input counts as "finish".

use crate::pipeline::controller::DecisionProvider;
use crate::pipeline::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use dialoguer::console::Term;
use dialoguer::{Confirm, Input};
use std::io::IsTerminal;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Batch decisions read from the operator's console
pub struct ConsolePrompt {
    piped: Option<Lines<BufReader<Stdin>>>,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        let piped = if std::io::stdin().is_terminal() {
            None
        } else {
            Some(BufReader::new(tokio::io::stdin()).lines())
        };
        Self { piped }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionProvider for ConsolePrompt {
    async fn read_choice(&mut self, next_round: u32) -> PipelineResult<Option<String>> {
        if let Some(lines) = self.piped.as_mut() {
            return lines.next_line().await.map_err(|e| PipelineError::Prompt {
                reason: e.to_string(),
            });
        }

        let prompt = format!(
            "Round {} done. Next batch (Single/Duplex/Finished)",
            next_round
        );
        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .default("F".to_string())
                .allow_empty(true)
                .interact_text_on(&Term::stderr())
        })
        .await
        .map_err(|e| PipelineError::Prompt {
            reason: e.to_string(),
        })?;

        match answer {
            Ok(text) => Ok(Some(text)),
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(e) => Err(PipelineError::Prompt {
                reason: e.to_string(),
            }),
        }
    }
}

/// Ask whether the working directory should be removed; yes by default.
///
/// Without a terminal, or with `assume_yes`, the default is taken without
/// asking. A failed prompt keeps the directory.
pub async fn confirm_removal(work_dir: &Path, assume_yes: bool) -> bool {
    if assume_yes || !std::io::stdin().is_terminal() {
        return true;
    }

    let prompt = format!("Remove temporary files ({})?", work_dir.display());
    let answer = tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .show_default(true)
            .interact_on(&Term::stderr())
    })
    .await;

    match answer {
        Ok(Ok(remove)) => remove,
        Ok(Err(e)) => {
            log::warn!("Cleanup prompt failed, keeping working directory: {}", e);
            false
        }
        Err(e) => {
            log::warn!("Cleanup prompt aborted, keeping working directory: {}", e);
            false
        }
    }
}
