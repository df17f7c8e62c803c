use std::{io::Write, path::Path};

use im3::PixelOperation;
use text_io::read;

pub enum Assume {
    Yes,
    No,
}

/// Parse a pixel operation given as `grayscale`, `dither` or
/// `brighten=<factor>`.
pub fn pixel_operation(s: &str) -> Result<PixelOperation, String> {
    if !s.is_ascii() {
        return Err(format!("Invalid filter {}", s))
    }

    let s_lower = s.to_lowercase();

    let operation = match s_lower.split_once('=') {
        None if s_lower == "grayscale" => PixelOperation::Grayscale,
        None if s_lower == "dither" => PixelOperation::OrderedDither,
        Some(("brighten", factor)) => {
            let factor: f64 = factor
                .parse()
                .map_err(|_| format!("Invalid brighten factor {}", factor))?;

            if !factor.is_finite() || factor < 0.0 {
                return Err(format!("Brighten factor must be positive, got {}", factor))
            }

            PixelOperation::Brighten(factor)
        }
        _ => return Err(format!("Invalid filter {}", s)),
    };

    Ok(operation)
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    let question = format!("{place} file {path:?} already exists. {action}? [y/N] ");
    ask(&mut std::io::stdout(), &question, || read!("{}\n"))
}

/// Keep asking until the answer is yes or no. The question is flushed
/// before every answer is read.
fn ask<W: Write, F: FnMut() -> String>(output: &mut W, question: &str, mut answer: F) -> bool {
    loop {
        if write!(output, "{question}").and_then(|_| output.flush()).is_err() {
            return false
        }

        let opt = answer().to_lowercase();

        if opt.is_empty() || opt == "n" {
            return false
        } else if opt == "y" {
            return true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_operations() {
        assert_eq!(pixel_operation("Grayscale"), Ok(PixelOperation::Grayscale));
        assert_eq!(pixel_operation("dither"), Ok(PixelOperation::OrderedDither));
        assert_eq!(pixel_operation("brighten=1.5"), Ok(PixelOperation::Brighten(1.5)));

        assert!(pixel_operation("brighten").is_err());
        assert!(pixel_operation("brighten=-1").is_err());
        assert!(pixel_operation("brighten=abc").is_err());
        assert!(pixel_operation("sepia").is_err());
    }

    /// Remembers how much had been written at the last flush.
    #[derive(Default)]
    struct Terminal {
        written: Vec<u8>,
        flushed: usize,
    }

    impl Write for Terminal {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = self.written.len();
            Ok(())
        }
    }

    #[test]
    fn prompt_is_flushed_until_answered() {
        let mut terminal = Terminal::default();
        let mut answers = vec!["Y", "maybe"];

        assert!(ask(&mut terminal, "Overwrite? ", || answers.pop().unwrap().to_string()));
        assert_eq!(terminal.written, b"Overwrite? Overwrite? ");
        assert_eq!(terminal.flushed, terminal.written.len());

        let mut terminal = Terminal::default();
        assert!(!ask(&mut terminal, "Overwrite? ", String::new));
        assert_eq!(terminal.flushed, terminal.written.len());
    }
}
