//! Welcome banner printed when the REPL starts.

use crate::cli::palette::Palette;

pub fn print_welcome_banner(
    palette: &Palette,
    assistant: &str,
    model: &str,
    history: &str,
    messages: usize,
) {
    println!();
    println!("  {}", palette.assistant(format!("Palaver \u{00b7} {assistant}")));
    println!();
    println!("  {}    {}", palette.bold("Model:"), palette.dim(model));
    println!(
        "  {}  {} {}",
        palette.bold("History:"),
        palette.dim(history),
        palette.dim(format!("({messages} messages)"))
    );
    println!();
    println!(
        "  {}",
        palette.dim("Type /help for commands, 'exit' or Ctrl+D to quit")
    );
    println!("  {}", palette.dim("---"));
    println!();
}
