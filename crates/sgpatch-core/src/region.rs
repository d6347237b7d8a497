//! Region tracking
//!
//! Recognizes struct and function bodies by their opening marker and follows
//! brace depth until the matching lone closing brace. Each region kind has its
//! own state slot, so the tracker never assumes the kinds are exclusive; it
//! only reports when they overlap.

use std::fmt;

use crate::rules::RuleCatalogue;

const KIND_COUNT: usize = 5;

/// Structural regions the transforms are scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Attributes,
    VertexDescriptionInputs,
    BuildVertexDescriptionInputs,
    VertexDescriptionFunction,
    PackedVaryings,
}

impl RegionKind {
    pub const ALL: [RegionKind; KIND_COUNT] = [
        RegionKind::Attributes,
        RegionKind::VertexDescriptionInputs,
        RegionKind::BuildVertexDescriptionInputs,
        RegionKind::VertexDescriptionFunction,
        RegionKind::PackedVaryings,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RegionKind::Attributes => "Attributes",
            RegionKind::VertexDescriptionInputs => "VertexDescriptionInputs",
            RegionKind::BuildVertexDescriptionInputs => "BuildVertexDescriptionInputs",
            RegionKind::VertexDescriptionFunction => "VertexDescriptionFunction",
            RegionKind::PackedVaryings => "PackedVaryings",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role of a line within an active region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// First line after the opening marker
    Entry,
    Body,
    /// The closing brace; emitted but never edited
    Exit,
}

impl LineRole {
    pub fn is_editable(self) -> bool {
        !matches!(self, LineRole::Exit)
    }
}

/// Per-kind roles for a single line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveRegions {
    roles: [Option<LineRole>; KIND_COUNT],
}

impl ActiveRegions {
    pub fn role(&self, kind: RegionKind) -> Option<LineRole> {
        self.roles[kind.index()]
    }

    /// True when `kind` is active and the line may be edited
    pub fn editable(&self, kind: RegionKind) -> bool {
        self.role(kind).is_some_and(LineRole::is_editable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionKind, LineRole)> + '_ {
        RegionKind::ALL
            .into_iter()
            .filter_map(|kind| self.role(kind).map(|role| (kind, role)))
    }

    pub fn is_empty(&self) -> bool {
        self.roles.iter().all(Option::is_none)
    }

    /// First pair of kinds active on the same line, if any
    pub fn overlap(&self) -> Option<(RegionKind, RegionKind)> {
        let mut active = self.iter().map(|(kind, _)| kind);
        let first = active.next()?;
        active.next().map(|second| (first, second))
    }

    fn set(&mut self, kind: RegionKind, role: LineRole) {
        self.roles[kind.index()] = Some(role);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RegionState {
    #[default]
    Inactive,
    /// Marker line seen; the region starts on the next line
    Opening { depth: i32, opened_at: usize },
    Active { depth: i32, opened_at: usize },
}

/// Line-by-line region state machine
#[derive(Debug)]
pub struct RegionTracker<'a> {
    catalogue: &'a RuleCatalogue,
    states: [RegionState; KIND_COUNT],
}

impl<'a> RegionTracker<'a> {
    pub fn new(catalogue: &'a RuleCatalogue) -> Self {
        Self {
            catalogue,
            states: [RegionState::Inactive; KIND_COUNT],
        }
    }

    /// Classify `line` and advance every region's state.
    ///
    /// `number` is the 1-based line number, used for diagnostics only.
    pub fn advance(&mut self, number: usize, line: &str) -> ActiveRegions {
        let mut regions = ActiveRegions::default();
        let code = strip_line_comment(line);
        let delta = brace_delta(code);

        for kind in RegionKind::ALL {
            let state = &mut self.states[kind.index()];
            match *state {
                RegionState::Inactive => {
                    if line.contains(self.catalogue.opening_marker(kind)) {
                        log::trace!("line {number}: opening {kind}");
                        *state = RegionState::Opening {
                            depth: delta,
                            opened_at: number,
                        };
                    }
                }
                RegionState::Opening { depth, opened_at } | RegionState::Active { depth, opened_at } => {
                    let depth = depth + delta;
                    if is_closing_brace(code) && depth <= 0 {
                        log::trace!("line {number}: closing {kind} opened at {opened_at}");
                        regions.set(kind, LineRole::Exit);
                        *state = RegionState::Inactive;
                    } else {
                        let role = if matches!(*state, RegionState::Opening { .. }) {
                            LineRole::Entry
                        } else {
                            LineRole::Body
                        };
                        regions.set(kind, role);
                        *state = RegionState::Active { depth, opened_at };
                    }
                }
            }
        }

        regions
    }

    /// Regions still open, with the line their marker was found on
    pub fn unclosed(&self) -> Vec<(RegionKind, usize)> {
        RegionKind::ALL
            .into_iter()
            .filter_map(|kind| match self.states[kind.index()] {
                RegionState::Inactive => None,
                RegionState::Opening { opened_at, .. } | RegionState::Active { opened_at, .. } => {
                    Some((kind, opened_at))
                }
            })
            .collect()
    }

    pub fn is_active(&self, kind: RegionKind) -> bool {
        matches!(self.states[kind.index()], RegionState::Active { .. })
    }
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn brace_delta(code: &str) -> i32 {
    code.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

fn is_closing_brace(code: &str) -> bool {
    matches!(code.trim(), "}" | "};")
}
