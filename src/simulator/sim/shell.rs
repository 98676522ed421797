use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Step(u32), // Step N peripheral cycles
  Status,
  Quit,
  Continue,
}

const HELP: &str = "Use Enter to step, 'si 100' to step N times, 's' for status, 'c' to continue, 'q' to quit";

/// Parses one shell line. An empty line steps once.
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
  let trimmed = line.trim();

  if trimmed.is_empty() {
    return Ok(Command::Step(1));
  }

  if let Some(rest) = trimmed.strip_prefix("si") {
    let num_str = rest.trim();
    if num_str.is_empty() {
      return Err("'si' requires a number, e.g., 'si 100'".to_string());
    }
    return match num_str.parse::<u32>() {
      Ok(n) if n > 0 => Ok(Command::Step(n)),
      Ok(_) => Err("step count must be greater than 0".to_string()),
      Err(e) => Err(format!("invalid number '{}': {}", num_str, e)),
    };
  }

  match trimmed {
    "q" => Ok(Command::Quit),
    "c" => Ok(Command::Continue),
    "s" => Ok(Command::Status),
    _ => Err(format!("Unknown command: '{}'. {}", trimmed, HELP)),
  }
}

pub struct Shell {
  editor: DefaultEditor,
  prompt: String,
}

impl Shell {
  pub fn new(prompt: &str) -> Result<Self> {
    let editor = DefaultEditor::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(Self {
      editor,
      prompt: format!("({}) ", prompt),
    })
  }

  pub fn read_command(&mut self) -> Result<Command> {
    loop {
      match self.editor.readline(&self.prompt) {
        Ok(line) => {
          let trimmed = line.trim();
          if !trimmed.is_empty() {
            let _ = self.editor.add_history_entry(trimmed);
          }

          match parse_command(trimmed) {
            Ok(cmd) => return Ok(cmd),
            Err(msg) => eprintln!("Error: {}", msg),
          }
        },
        // Ctrl-C / Ctrl-D
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Command::Quit),
        Err(err) => return Err(io::Error::new(io::ErrorKind::Other, err)),
      }
    }
  }
}
