use std::{
    fmt,
    io::{BufRead, Write},
};

use tracing::{info, warn};

use crate::{
    chart::{self, DemoContext},
    error::Result,
    figure::encode_data_uri,
};

/// One line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status<'a> {
    Started,
    Drawing(&'a str),
    /// `data:image/png;base64,...`
    Image(String),
    UnknownChart,
    Ended,
}

impl fmt::Display for Status<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Started => f.write_str("Script started"),
            Status::Drawing(name) => write!(f, "Drawing {}", name),
            Status::Image(uri) => f.write_str(uri),
            Status::UnknownChart => f.write_str("Unknown chart"),
            Status::Ended => f.write_str("Script ended"),
        }
    }
}

fn emit<W: Write>(output: &mut W, status: &Status<'_>) -> Result<()> {
    writeln!(output, "{}", status)?;
    output.flush()?;
    Ok(())
}

/// Reads chart names line by line until EOF, answering each with a
/// `Drawing` line followed by either the image or `Unknown chart`.
pub fn run<R: BufRead, W: Write>(input: R, output: &mut W, ctx: &mut DemoContext) -> Result<()> {
    emit(output, &Status::Started)?;
    for line in input.lines() {
        let line = line?;
        let name = line.as_str();
        info!("drawing {}", name);
        emit(output, &Status::Drawing(name))?;
        match chart::draw(name, ctx)? {
            Some(figure) => emit(output, &Status::Image(encode_data_uri(figure)?))?,
            None => {
                warn!("unknown chart: {}", name);
                emit(output, &Status::UnknownChart)?
            }
        }
    }
    emit(output, &Status::Ended)?;
    info!("input closed");
    Ok(())
}

#[test]
fn status_lines() {
    assert_eq!(Status::Started.to_string(), "Script started");
    assert_eq!(Status::Drawing("Scatter Demo2").to_string(), "Drawing Scatter Demo2");
    assert_eq!(Status::Image("data:x".into()).to_string(), "data:x");
    assert_eq!(Status::UnknownChart.to_string(), "Unknown chart");
    assert_eq!(Status::Ended.to_string(), "Script ended");
}
