use std::io::IsTerminal;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
    /// Symbol prefixed to monetary amounts
    pub currency: String,
}

/// Resolve whether to emit ANSI colors from the `--no-color` flag and the
/// `settings.color` mode (`auto`, `always`, `never`).
pub fn detect_color(color_flag: bool, mode: &str) -> bool {
    if !color_flag {
        return false;
    }
    match mode {
        "never" => false,
        "always" => true,
        _ => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}

/// Print `value` as JSON on stdout, honoring `--pretty`.
pub fn print_json<T: Serialize>(value: &T, opts: &OutputOptions) -> anyhow::Result<()> {
    let json = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Braille spinner on stderr while `msg` is in progress. Only runs for text
/// output on a terminal without `--verbose`; stop it with [`stop_spinner`].
pub fn start_spinner(msg: &'static str, opts: &OutputOptions) -> Option<tokio::task::JoinHandle<()>> {
    if opts.format != OutputFormat::Text || opts.verbose || !std::io::stderr().is_terminal() {
        return None;
    }
    Some(tokio::spawn(async move {
        let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0usize;
        loop {
            eprint!("\r {} {}", frames[i % frames.len()], msg);
            i = i.wrapping_add(1);
            tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        }
    }))
}

pub fn stop_spinner(spinner: Option<tokio::task::JoinHandle<()>>) {
    if let Some(s) = spinner {
        s.abort();
        eprint!("\r\x1b[2K");
    }
}
