use clap::ValueEnum;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use media_catalog_models::{Show, Video};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn heading(&self, text: impl AsRef<str>) {
        if self.quiet || !self.is_human() {
            return;
        }
        println!("\n{}", text.as_ref().bold().underline());
    }

    pub fn note(&self, text: impl AsRef<str>) {
        if self.quiet || !self.is_human() {
            return;
        }
        println!("{}", text.as_ref().dimmed());
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> color_eyre::Result<()> {
        let rendered = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        };
        println!("{}", rendered);
        Ok(())
    }
}

pub fn shows_table(shows: &[Show]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Title", "Type", "Quality", "Id"]);
    for (i, show) in shows.iter().enumerate() {
        let (kind, quality) = match show {
            Show::Movie(m) => ("movie", m.quality.clone()),
            Show::Tv(t) => ("tv", t.quality.clone()),
        };
        table.add_row(vec![
            (i + 1).to_string(),
            show.title().to_string(),
            kind.to_string(),
            quality.unwrap_or_default(),
            show.id().to_string(),
        ]);
    }
    table
}

pub fn print_video(video: &Video, server: &str) {
    println!("{} {}", "Server:".bold(), server);
    println!("{} {}", "Stream:".bold(), video.source.green());
    println!("{} {}", "Format:".bold(), video.format.mime());

    if !video.headers.is_empty() {
        println!("{}", "Headers:".bold());
        for (name, value) in &video.headers {
            println!("  {}: {}", name, value);
        }
    }
    if !video.subtitles.is_empty() {
        println!("{}", "Subtitles:".bold());
        for subtitle in &video.subtitles {
            let marker = if subtitle.default { " (default)" } else { "" };
            println!("  {}{} - {}", subtitle.label, marker, subtitle.file);
        }
    }
}
