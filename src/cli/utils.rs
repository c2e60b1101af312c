use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Progress line; suppressed in JSON mode
pub fn output_info(output_format: &OutputFormat, message: &str) {
    if let OutputFormat::Text = output_format {
        println!("{}", message);
    }
}

/// Asks `question` on stdout and reads one line from `input`.
pub fn prompt(question: &str, input: &mut impl BufRead) -> anyhow::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
