use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use tastegraph::admin::{VerifyFinding, VerifySeverity};
use tastegraph::pipeline::{Explanation, Verdict};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

/// Text-mode rendering. Report bodies go to stdout; status lines and
/// spinners go to stderr.
pub struct Ui {
    styles: Styles,
    color: bool,
    quiet: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Level {
    Ok,
    Warn,
    Fail,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let color = !quiet && theme != Theme::Plain && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if color {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            styles: Styles::for_theme(theme),
            color,
            quiet,
        }
    }

    /// Titled block of `key: value` lines with keys right-aligned.
    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(&str, String)> = rows
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if rows.is_empty() {
            return;
        }
        self.title(title);
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            let key = format!("{key:>width$}:");
            println!(
                "  {} {}",
                self.paint(self.styles.key, &key),
                self.paint(self.styles.value, &value)
            );
        }
    }

    pub fn list<I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return;
        }
        self.title(title);
        let bullet = if self.color { "•" } else { "-" };
        for entry in entries {
            println!("  {} {entry}", self.paint(self.styles.key, bullet));
        }
    }

    /// One block per explained pair, with the verdict colored by outcome.
    pub fn explanation(&self, exp: &Explanation) {
        self.title(&format!("person {} / artist {}", exp.person, exp.artist));
        let verdict_style = match exp.verdict {
            Verdict::Recommended => self.styles.ok,
            Verdict::SuppressedByDislike | Verdict::DislikedByFriends => self.styles.fail,
            Verdict::OwnOpinion | Verdict::NoSignal => self.styles.muted,
        };
        let own = if exp.own.is_empty() {
            "-".to_string()
        } else {
            join(&exp.own)
        };
        for (key, value, style) in [
            ("verdict", exp.verdict.to_string(), verdict_style),
            ("own", own, self.styles.value),
            ("liked by", join(&exp.liked_by), self.styles.value),
            ("disliked by", join(&exp.disliked_by), self.styles.value),
        ] {
            println!(
                "  {} {}",
                self.paint(self.styles.key, &format!("{key:>11}:")),
                self.paint(style, &value)
            );
        }
    }

    pub fn findings(&self, findings: &[VerifyFinding]) {
        if findings.is_empty() {
            return;
        }
        self.title("Findings");
        for finding in findings {
            let (tag, style) = match finding.severity {
                VerifySeverity::Info => ("info", self.styles.muted),
                VerifySeverity::Warning => ("warn", self.styles.warn),
                VerifySeverity::Error => ("error", self.styles.fail),
            };
            println!(
                "  {} {}",
                self.paint(style, &format!("[{tag:>5}]")),
                finding.message
            );
        }
    }

    pub fn success(&self, message: &str) {
        self.status(Level::Ok, message);
    }

    pub fn warn(&self, message: &str) {
        self.status(Level::Warn, message);
    }

    pub fn failure(&self, message: &str) {
        self.status(Level::Fail, message);
    }

    /// Spinner on stderr for a step that may take a while. Hidden when quiet
    /// or when stderr is not a terminal.
    pub fn task(&self, label: impl Into<String>) -> TaskGuard {
        let bar = (!self.quiet && std::io::stderr().is_terminal()).then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {elapsed}") {
                bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
            }
            bar.set_message(label.into());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        TaskGuard {
            started: Instant::now(),
            bar,
        }
    }

    fn status(&self, level: Level, message: &str) {
        if self.quiet {
            if level != Level::Ok {
                eprintln!("{message}");
            }
            return;
        }
        let (icon, style) = match level {
            Level::Ok => ("ok", self.styles.ok),
            Level::Warn => ("warning", self.styles.warn),
            Level::Fail => ("failed", self.styles.fail),
        };
        eprintln!("{} {message}", self.paint(style, &format!("{icon}:")));
    }

    fn title(&self, title: &str) {
        if self.quiet {
            println!("{title}");
        } else {
            println!("{}", self.paint(self.styles.title, &format!("== {title}")));
        }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

pub struct TaskGuard {
    started: Instant,
    bar: Option<ProgressBar>,
}

impl TaskGuard {
    pub fn finish(mut self) -> Duration {
        self.clear();
        self.started.elapsed()
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.clear();
    }
}

pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_secs_f64() * 1_000.0;
    if ms >= 1_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else {
        format!("{ms:.1}ms")
    }
}

fn join<T: Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Copy)]
struct Styles {
    title: Style,
    key: Style,
    value: Style,
    muted: Style,
    ok: Style,
    warn: Style,
    fail: Style,
}

impl Styles {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Plain => Self {
                title: Style::new(),
                key: Style::new(),
                value: Style::new(),
                muted: Style::new(),
                ok: Style::new(),
                warn: Style::new(),
                fail: Style::new(),
            },
            Theme::Light => Self {
                title: Color::Blue.bold(),
                key: Color::DarkGray.bold(),
                value: Style::new().fg(Color::Black),
                muted: Style::new().fg(Color::DarkGray),
                ok: Color::Green.bold(),
                warn: Color::Magenta.bold(),
                fail: Color::Red.bold(),
            },
            Theme::Dark | Theme::Auto => Self {
                title: Color::Cyan.bold(),
                key: Color::LightBlue.normal(),
                value: Style::new().fg(Color::White),
                muted: Style::new().fg(Color::DarkGray),
                ok: Color::LightGreen.bold(),
                warn: Color::Yellow.bold(),
                fail: Color::LightRed.bold(),
            },
        }
    }
}
