use clap::Parser;

fn main() {
    if let Err(err) = Cli::parse().run() {
        if !err.is_empty() {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}

/// Tools for working with AutoCAD MTEXT content.
#[derive(Debug, Parser)]
#[command(
    name = "mtexttools",
    version = "0.1",
    about,
    long_about,
    max_term_width(100)
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn run(self) -> Result<(), String> {
        match self.command {
            Command::Tokenize(tokenize) => tokenize.run(),
            Command::Plain(plain) => plain.run(),
            Command::Fonts(fonts) => fonts.run(),
        }
    }
}

#[derive(Clone, Debug, clap::Subcommand)]
enum Command {
    /// Tokenize MTEXT content and print the tokens.
    ///
    /// By default each token's value is printed on its own line in debug
    /// form. With `--json` the full token sequence — including the
    /// formatting state frozen into every token — is printed as a JSON
    /// array:
    ///
    ///     $ mtexttools tokenize --json '{\C1;Red} Normal'
    ///
    /// Inline formatting state changes are normally silent. Pass
    /// `--properties` to surface them as PropertiesChanged tokens.
    Tokenize(Tokenize),
    /// Print the content with all formatting stripped.
    Plain(Plain),
    /// List the font names referenced by inline formatting codes.
    Fonts(Fonts),
}

#[derive(Clone, Debug, clap::Args)]
struct Input {
    /// MTEXT content to process.
    content: Option<String>,
    /// Read the content from a file instead.
    #[arg(long, short)]
    path: Option<std::path::PathBuf>,
}

impl Input {
    fn read(&self) -> Result<String, String> {
        match (&self.content, &self.path) {
            (Some(content), None) => Ok(content.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|err| format!["failed to read {}: {err}", path.display()]),
            (Some(_), Some(_)) => Err("provide either content or --path, not both".into()),
            (None, None) => Err("provide MTEXT content or --path".into()),
        }
    }
}

#[derive(Clone, Debug, clap::Args)]
struct Tokenize {
    #[command(flatten)]
    input: Input,
    /// Output the tokens as a JSON array.
    #[arg(long)]
    json: bool,
    /// Emit PropertiesChanged tokens for state changes.
    #[arg(long)]
    properties: bool,
    /// Reset paragraph properties on every new paragraph.
    #[arg(long)]
    reset_paragraphs: bool,
}

impl Tokenize {
    fn run(self) -> Result<(), String> {
        let content = self.input.read()?;
        let options = mtext::Options {
            yield_property_commands: self.properties,
            reset_paragraph_parameters: self.reset_paragraphs,
            ..mtext::Options::default()
        };
        let tokens: Vec<mtext::Token> =
            mtext::Tokenizer::with_options(&content, mtext::FormattingState::default(), options)
                .collect();
        if self.json {
            let json = serde_json::to_string_pretty(&tokens)
                .map_err(|err| format!["failed to serialize tokens: {err}"])?;
            println!("{json}");
        } else {
            for token in tokens {
                println!("{:?}", token.value);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
struct Plain {
    #[command(flatten)]
    input: Input,
}

impl Plain {
    fn run(self) -> Result<(), String> {
        let content = self.input.read()?;
        println!("{}", mtext::strings::plain_text(&content));
        Ok(())
    }
}

#[derive(Clone, Debug, clap::Args)]
struct Fonts {
    #[command(flatten)]
    input: Input,
    /// Keep font file extensions instead of stripping them.
    #[arg(long)]
    keep_extension: bool,
}

impl Fonts {
    fn run(self) -> Result<(), String> {
        let content = self.input.read()?;
        for name in mtext::strings::extract_font_names(&content, !self.keep_extension) {
            println!("{name}");
        }
        Ok(())
    }
}
