//! ffmpeg `filter_complex` graphs as an explicit DAG of named stages.
//!
//! Each stage reads one or more pads (a raw input stream or the labelled
//! output of an earlier stage), applies a filter chain, and produces exactly
//! one labelled output. Labels are checked as stages are pushed, so a graph
//! that renders is always well-formed: no dangling references and no label
//! consumed twice.

use std::collections::HashSet;
use std::fmt;

use reelsmith_common::error::{ReelsmithError, ReelsmithResult};

/// Stream selector on a numbered `-i` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    fn specifier(self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }
}

/// An input pad of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    /// A stream of the `index`-th `-i` input, e.g. `[0:v]`.
    Input { index: usize, kind: StreamKind },
    /// The output of an earlier stage.
    Label(String),
}

impl Pad {
    pub fn video(index: usize) -> Self {
        Pad::Input {
            index,
            kind: StreamKind::Video,
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        Pad::Label(name.into())
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Input { index, kind } => write!(f, "[{index}:{}]", kind.specifier()),
            Pad::Label(name) => write!(f, "[{name}]"),
        }
    }
}

/// One filter with positional and named arguments.
///
/// Argument values are stored raw and escaped when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    args: Vec<(Option<String>, String)>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push((None, value.into()));
        self
    }

    /// Append a `key=value` argument.
    pub fn opt(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((Some(key.into()), value.into()));
        self
    }

    /// Raw value of a named argument.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { "=" } else { ":" })?;
            if let Some(key) = key {
                write!(f, "{key}=")?;
            }
            f.write_str(&escape_filter_value(value))?;
        }
        Ok(())
    }
}

/// Escape a filter argument for both levels ffmpeg parses: the option
/// string (`\ ' :`) and then the graph description (`\ ' [ ] , ;`).
pub fn escape_filter_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }
    graph_level
}

/// A named node of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub inputs: Vec<Pad>,
    pub filters: Vec<Filter>,
    pub output: String,
}

impl Stage {
    /// A stage whose output label is its own name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output: name.clone(),
            name,
            inputs: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn input(mut self, pad: Pad) -> Self {
        self.inputs.push(pad);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Override the output label.
    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.output = label.into();
        self
    }

    pub fn filter_named(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{pad}")?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{filter}")?;
        }
        write!(f, "[{}]", self.output)
    }
}

/// Ordered, validated set of stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    stages: Vec<Stage>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage and return a pad for its output.
    pub fn push(&mut self, stage: Stage) -> ReelsmithResult<Pad> {
        if stage.filters.is_empty() {
            return Err(graph_error(format!("stage '{}' has no filters", stage.name)));
        }
        if stage.inputs.is_empty() {
            return Err(graph_error(format!("stage '{}' has no inputs", stage.name)));
        }
        if self.stages.iter().any(|s| s.output == stage.output) {
            return Err(graph_error(format!(
                "label '{}' is produced twice",
                stage.output
            )));
        }

        let consumed = self.consumed_labels();
        for pad in &stage.inputs {
            if let Pad::Label(label) = pad {
                if !self.stages.iter().any(|s| &s.output == label) {
                    return Err(graph_error(format!(
                        "stage '{}' reads unknown label '{label}'",
                        stage.name
                    )));
                }
                if consumed.contains(label.as_str()) {
                    return Err(graph_error(format!(
                        "stage '{}' reads label '{label}' that is already consumed",
                        stage.name
                    )));
                }
            }
        }

        let pad = Pad::Label(stage.output.clone());
        self.stages.push(stage);
        Ok(pad)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Labels no stage reads. These are what `-map` can select.
    pub fn sinks(&self) -> Vec<&str> {
        let consumed = self.consumed_labels();
        self.stages
            .iter()
            .map(|s| s.output.as_str())
            .filter(|label| !consumed.contains(label))
            .collect()
    }

    /// The `-filter_complex` argument.
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    fn consumed_labels(&self) -> HashSet<&str> {
        self.stages
            .iter()
            .flat_map(|s| s.inputs.iter())
            .filter_map(|pad| match pad {
                Pad::Label(label) => Some(label.as_str()),
                Pad::Input { .. } => None,
            })
            .collect()
    }
}

fn graph_error(message: String) -> ReelsmithError {
    ReelsmithError::render(format!("invalid filter graph: {message}"))
}
