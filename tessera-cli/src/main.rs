//! Tessera CLI
//!
//! Renders a node tree in its JSON interchange form to fixed-width text.
//!
//! - `tessera page.json`              # plain text at the terminal width
//! - `tessera --width 60 --color -`   # ANSI styled, tree read from stdin
//! - `tessera --annotations page.json` # text plus annotations as JSON

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tessera_common::warning::warning_count;
use tessera_dom::parse_json_tree;
use tessera_render::{
    Annotation, AnnotationKind, DisplayMode, Face, PlainSurface, RenderOptions, Rendered, TargetWidth,
    render,
};

/// Tessera: render markup trees into fixed-width, style-annotated text
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render at the terminal width
    tessera page.json

    # Wrap to 60 columns with colors and faces
    tessera --width 60 --color page.json

    # Read the tree from stdin and dump the annotations
    cat page.json | tessera --annotations -

    # Render image alt text for anything served from an ad host
    tessera --block-images '^https?://ads\.' page.json
"#)]
struct Cli {
    /// Path to the JSON node tree, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: String,

    /// Wrap to this many columns instead of the full terminal width
    #[arg(short, long)]
    width: Option<usize>,

    /// Terminal width (falls back to $COLUMNS, then 80)
    #[arg(long, env = "COLUMNS", default_value = "80")]
    columns: usize,

    /// Regular expression for image sources to render as alt text
    #[arg(long, value_name = "PATTERN")]
    block_images: Vec<String>,

    /// Display mode: visible, audible or echo
    #[arg(long, default_value = "visible")]
    mode: DisplayMode,

    /// Style the output with ANSI colors and faces
    #[arg(long)]
    color: bool,

    /// Print the text and its annotations as JSON
    #[arg(long, conflicts_with = "color")]
    annotations: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = read_source(&cli.path)?;
    let tree = parse_json_tree(&source).with_context(|| format!("loading tree from {}", cli.path))?;

    let options = render_options(&cli)?;
    let surface = PlainSurface::new(cli.columns);

    let rendered = render(&tree, &options, &surface);

    if cli.annotations {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        match options.display_mode {
            DisplayMode::Echo => println!("{}", echo_line(&rendered)),
            DisplayMode::Audible => print!("{}", rendered.text),
            DisplayMode::Visible if cli.color => print!("{}", to_ansi(&rendered)),
            DisplayMode::Visible => print!("{}", rendered.text),
        }
    }

    let warnings = warning_count();
    if warnings > 0 {
        eprintln!("{}", format!("{warnings} rendering warning(s)").dimmed());
    }
    Ok(())
}

/// Options from the flags. Without `--width` the text fills the surface.
fn render_options(cli: &Cli) -> Result<RenderOptions> {
    let options = RenderOptions::new()
        .with_display_mode(cli.mode)
        .block_images(&cli.block_images)?;
    Ok(match cli.width {
        Some(width) => options.with_fixed_width(width),
        None => options.with_width(TargetWidth::Full),
    })
}

/// Read the tree source from a file, or stdin for `-`.
fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut source = String::new();
        let _ = io::stdin()
            .read_to_string(&mut source)
            .context("reading tree from stdin")?;
        Ok(source)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {path}"))
    }
}

/// The rendered text folded onto one line.
fn echo_line(rendered: &Rendered) -> String {
    rendered.text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The owo-colors style for one run of text covered by `covering`.
fn style_for(covering: &[&Annotation]) -> Style {
    let mut style = Style::new();
    for ann in covering {
        style = match &ann.kind {
            AnnotationKind::Face { face } => match face {
                Face::Bold => style.bold(),
                Face::Italic => style.italic(),
                Face::Underline => style.underline(),
                Face::Strikethrough => style.strikethrough(),
                Face::Monospace => style,
            },
            AnnotationKind::Colors {
                foreground,
                background,
            } => {
                let mut colored = style;
                if let Some(fg) = foreground {
                    colored = colored.truecolor(fg.r, fg.g, fg.b);
                }
                if let Some(bg) = background {
                    colored = colored.on_truecolor(bg.r, bg.g, bg.b);
                }
                colored
            }
            AnnotationKind::Link { .. } => style.underline(),
            AnnotationKind::Image { .. } => style.italic(),
            AnnotationKind::Break => style.dimmed(),
        };
    }
    style
}

/// Split the text at every annotation boundary and style each run.
fn to_ansi(rendered: &Rendered) -> String {
    let text = rendered.text.as_str();
    let mut cuts: Vec<usize> = rendered
        .annotations
        .iter()
        .flat_map(|ann| [ann.start, ann.end])
        .chain([0, text.len()])
        .filter(|&pos| text.is_char_boundary(pos))
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::with_capacity(text.len() * 2);
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let run = &text[start..end];
        let covering: Vec<&Annotation> = rendered
            .annotations
            .iter()
            .filter(|ann| ann.start <= start && end <= ann.end)
            .collect();
        if covering.is_empty() {
            out.push_str(run);
            continue;
        }
        // styles never cross a newline so the terminal resets each line
        let style = style_for(&covering);
        for (i, line) in run.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !line.is_empty() {
                out.push_str(&line.style(style).to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_dom::DomTree;

    fn sample() -> Rendered {
        let mut tree = DomTree::new();
        let p = tree.append_element(tree.root(), "p", &[]);
        let _ = tree.append_text(p, "plain ");
        let b = tree.append_element(p, "b", &[]);
        let _ = tree.append_text(b, "bold");
        render(&tree, &RenderOptions::new().with_fixed_width(40), &PlainSurface::default())
    }

    #[test]
    fn test_ansi_keeps_unannotated_text() {
        let out = to_ansi(&sample());
        assert!(out.starts_with("plain "));
        assert!(out.contains("bold"));
        assert!(out.contains('\u{1b}'));
    }

    #[test]
    fn test_echo_line_joins_lines() {
        let mut tree = DomTree::new();
        for text in ["one", "two"] {
            let p = tree.append_element(tree.root(), "p", &[]);
            let _ = tree.append_text(p, text);
        }
        let out = render(&tree, &RenderOptions::new(), &PlainSurface::default());
        assert_eq!(echo_line(&out), "one two");
    }

    #[test]
    fn test_cli_parses_mode_case_insensitively() {
        let cli = Cli::parse_from(["tessera", "--mode", "Echo", "-w", "30", "page.json"]);
        assert_eq!(cli.mode, DisplayMode::Echo);
        assert_eq!(cli.width, Some(30));
    }

    #[test]
    fn test_width_flag_selects_fixed_or_full_width() {
        let fixed = render_options(&Cli::parse_from(["tessera", "-w", "30", "page.json"])).unwrap();
        assert_eq!(fixed.width, TargetWidth::Fixed(30));

        let full = render_options(&Cli::parse_from(["tessera", "page.json"])).unwrap();
        assert_eq!(full.width, TargetWidth::Full);
    }

    #[test]
    fn test_bad_block_pattern_is_reported() {
        let cli = Cli::parse_from(["tessera", "--block-images", "(", "page.json"]);
        assert!(render_options(&cli).is_err());
    }

    #[test]
    fn test_full_width_flag_is_not_accepted() {
        assert!(Cli::try_parse_from(["tessera", "--full-width", "page.json"]).is_err());
    }
}
