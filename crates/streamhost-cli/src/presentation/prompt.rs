//! Dialogs rendered on the terminal, answered on stdin.

use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Mutex, PoisonError};

use streamhost_core::ports::{Alert, AlertKind, AlertPresenter};

struct ConsoleIo {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

/// [`AlertPresenter`] that numbers the buttons and reads a choice.
///
/// An empty line, `q`, or end of input closes the dialog.
pub struct ConsoleAlerts {
    io: Mutex<ConsoleIo>,
}

impl std::fmt::Debug for ConsoleAlerts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleAlerts").finish_non_exhaustive()
    }
}

impl Default for ConsoleAlerts {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleAlerts {
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }

    pub fn with_io(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            io: Mutex::new(ConsoleIo {
                input: Box::new(input),
                output: Box::new(output),
            }),
        }
    }

    fn render(output: &mut dyn Write, alert: &Alert) -> io::Result<()> {
        let marker = match alert.kind {
            AlertKind::Info => "ℹ️ ",
            AlertKind::Warning => "⚠️ ",
            AlertKind::Error => "❌",
        };
        writeln!(output)?;
        writeln!(output, "{marker} {}", alert.title)?;
        writeln!(output, "{}", alert.message)?;
        if alert.buttons.len() > 1 {
            for (index, label) in alert.buttons.iter().enumerate() {
                writeln!(output, "  [{}] {label}", index + 1)?;
            }
        }
        output.flush()
    }

    fn ask(io: &mut ConsoleIo, alert: &Alert) -> io::Result<Option<usize>> {
        Self::render(io.output.as_mut(), alert)?;

        // Nothing to choose between; acknowledge and move on
        if alert.buttons.len() <= 1 {
            return Ok(Some(0));
        }

        loop {
            write!(io.output, "Choose 1-{} (Enter to close): ", alert.buttons.len())?;
            io.output.flush()?;

            let mut line = String::new();
            if io.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match parse_choice(trimmed, &alert.buttons) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(io.output, "Not an option: {trimmed}")?,
            }
        }
    }
}

impl AlertPresenter for ConsoleAlerts {
    fn show_alert(&self, alert: &Alert) -> Option<usize> {
        let mut io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        match Self::ask(&mut io, alert) {
            Ok(choice) => choice,
            Err(e) => {
                tracing::warn!(error = %e, title = %alert.title, "Prompt failed; treating dialog as closed");
                None
            }
        }
    }
}

/// Match a 1-based number or a case-insensitive button label.
pub fn parse_choice(input: &str, buttons: &[String]) -> Option<usize> {
    let input = input.trim();
    if let Ok(number) = input.parse::<usize>() {
        return (1..=buttons.len()).contains(&number).then(|| number - 1);
    }
    buttons
        .iter()
        .position(|label| label.eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn chooser() -> Alert {
        Alert::new(AlertKind::Info, "Streaming backend", "Pick one")
            .with_buttons(["Stremio Service", "server.js"])
    }

    #[test]
    fn test_parse_choice() {
        let buttons = vec!["Open folder".to_string(), "Confirm".to_string()];
        assert_eq!(parse_choice("1", &buttons), Some(0));
        assert_eq!(parse_choice(" 2 ", &buttons), Some(1));
        assert_eq!(parse_choice("3", &buttons), None);
        assert_eq!(parse_choice("0", &buttons), None);
        assert_eq!(parse_choice("confirm", &buttons), Some(1));
        assert_eq!(parse_choice("maybe", &buttons), None);
    }

    #[test]
    fn test_numbered_choice() {
        let out = SharedBuf::default();
        let alerts = ConsoleAlerts::with_io(Cursor::new("2\n"), out.clone());
        assert_eq!(alerts.show_alert(&chooser()), Some(1));
        let text = out.text();
        assert!(text.contains("[1] Stremio Service"));
        assert!(text.contains("[2] server.js"));
    }

    #[test]
    fn test_invalid_then_valid() {
        let out = SharedBuf::default();
        let alerts = ConsoleAlerts::with_io(Cursor::new("7\nserver.js\n"), out.clone());
        assert_eq!(alerts.show_alert(&chooser()), Some(1));
        assert!(out.text().contains("Not an option: 7"));
    }

    #[test]
    fn test_empty_line_and_eof_close() {
        let alerts = ConsoleAlerts::with_io(Cursor::new("\n"), io::sink());
        assert_eq!(alerts.show_alert(&chooser()), None);

        let alerts = ConsoleAlerts::with_io(Cursor::new(""), io::sink());
        assert_eq!(alerts.show_alert(&chooser()), None);
    }

    #[test]
    fn test_single_button_does_not_block() {
        let alerts = ConsoleAlerts::with_io(Cursor::new(""), io::sink());
        let alert = Alert::new(AlertKind::Error, "Streaming unavailable", "No backend");
        assert_eq!(alerts.show_alert(&alert), Some(0));
    }
}
