use super::engine::{OcrEngine, Recognition};
use crate::{Error, Result, config::OcrConfig};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::debug;

/// Runs the `tesseract` CLI, feeding the image on stdin and reading text from stdout.
pub struct TesseractEngine {
    command: String,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8], language: &str) -> Result<Recognition> {
        debug!(
            "Running {} on {} bytes (lang={})",
            self.command,
            image.len(),
            language
        );

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::ocr(format!("Failed to execute {}: {}", self.command, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::ocr("tesseract stdin unavailable"))?;

        // Feed stdin while draining stdout so neither pipe can fill up and stall.
        let feed = async move {
            let written = stdin.write_all(image).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| Error::ocr(format!("tesseract did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let status = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(Error::ocr(format!(
                "tesseract exited with status {}: {}",
                status, stderr
            )));
        }

        written.map_err(|e| Error::ocr(format!("Failed to send image to tesseract: {}", e)))?;

        Ok(Recognition {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
