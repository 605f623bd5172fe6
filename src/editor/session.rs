use super::{byte_offset, char_len};
use crate::{Issue, IssueKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    Pending,
    Applied,
}

/// An issue bound to an editor session, carrying its mutable anchor and status.
#[derive(Debug, Clone)]
pub struct SessionIssue {
    pub id: usize,
    pub kind: IssueKind,
    pub original: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub position: Position,
    pub status: IssueStatus,
}

impl SessionIssue {
    pub fn is_pending(&self) -> bool {
        self.status == IssueStatus::Pending
    }
}

/// One editable copy of a document plus the findings anchored into it.
///
/// Anchors are half-open character ranges into the current buffer. Every
/// splice re-normalizes the anchors of the remaining pending issues, so a
/// pending range always denotes the span the issue still refers to.
pub struct Session {
    file_id: String,
    original: String,
    buffer: String,
    issues: Vec<SessionIssue>,
    initial: Vec<SessionIssue>,
}

impl Session {
    /// Open a session for one document. Overlapping issue ranges are
    /// reconciled here: issues are walked in ascending start order and any
    /// range intersecting an already-accepted pending range is dropped
    /// (earliest start wins), so session ranges are always disjoint.
    pub fn new(file_id: impl Into<String>, content: impl Into<String>, issues: &[Issue]) -> Self {
        let original: String = content.into();
        let initial = reconcile(issues);

        Self {
            file_id: file_id.into(),
            buffer: original.clone(),
            original,
            issues: initial.clone(),
            initial,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn issues(&self) -> &[SessionIssue] {
        &self.issues
    }

    pub fn pending(&self) -> impl Iterator<Item = &SessionIssue> {
        self.issues.iter().filter(|i| i.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn applied_count(&self) -> usize {
        self.issues.len() - self.pending_count()
    }

    /// Apply `replacement` to one pending issue. Returns false and leaves the
    /// session untouched when the id is unknown, the issue was already
    /// applied, or the replacement is empty.
    pub fn apply(&mut self, issue_id: usize, replacement: &str) -> bool {
        match apply_replacement(&self.buffer, &self.issues, issue_id, replacement) {
            Some((buffer, issues)) => {
                self.buffer = buffer;
                self.issues = issues;
                true
            }
            None => false,
        }
    }

    /// Apply the first suggestion of every pending issue that has one, in
    /// ascending start order, threading each splice's output into the next.
    /// Returns the number of issues applied.
    pub fn apply_all(&mut self) -> usize {
        let mut order: Vec<usize> = self
            .issues
            .iter()
            .filter(|i| i.is_pending() && !i.suggestions.is_empty())
            .map(|i| i.id)
            .collect();
        // Pending ranges are disjoint and shifts preserve their relative
        // order, so sorting once up front is ascending current-start order
        // at every step of the fold.
        order.sort_by_key(|&id| self.position_of(id));

        let buffer = std::mem::take(&mut self.buffer);
        let issues = std::mem::take(&mut self.issues);

        let (buffer, issues, applied) =
            order
                .into_iter()
                .fold((buffer, issues, 0usize), |(text, issues, n), id| {
                    let replacement = issues
                        .iter()
                        .find(|i| i.id == id)
                        .and_then(|i| i.suggestions.first())
                        .cloned();
                    match replacement
                        .and_then(|r| apply_replacement(&text, &issues, id, &r))
                    {
                        Some((text, issues)) => (text, issues, n + 1),
                        None => (text, issues, n),
                    }
                });

        self.buffer = buffer;
        self.issues = issues;
        applied
    }

    /// Restore the original content and every issue's initial anchor/status.
    pub fn reset(&mut self) {
        self.buffer = self.original.clone();
        self.issues = self.initial.clone();
    }

    /// Current buffer, verbatim. Pure read.
    pub fn export(&self) -> &str {
        &self.buffer
    }

    fn position_of(&self, issue_id: usize) -> usize {
        self.issues
            .iter()
            .find(|i| i.id == issue_id)
            .map_or(usize::MAX, |i| i.position.start)
    }
}

/// Splice one replacement into `text` and re-anchor the issue list.
///
/// Returns None for the defined no-op cases: unknown id, already-applied
/// issue, empty replacement. Otherwise the target's range becomes
/// `[start, start + len(replacement))` and its status `Applied`; every other
/// pending issue lying entirely after the edited span shifts by the length
/// delta, and issues overlapping or preceding it keep their anchors.
fn apply_replacement(
    text: &str,
    issues: &[SessionIssue],
    issue_id: usize,
    replacement: &str,
) -> Option<(String, Vec<SessionIssue>)> {
    if replacement.is_empty() {
        return None;
    }
    let target = issues.iter().find(|i| i.id == issue_id && i.is_pending())?;

    let len = char_len(text);
    let start = target.position.start.min(len);
    let end = target.position.end.clamp(start, len);

    let byte_start = byte_offset(text, start);
    let byte_end = byte_offset(text, end);

    let mut next = String::with_capacity(text.len() + replacement.len());
    next.push_str(&text[..byte_start]);
    next.push_str(replacement);
    next.push_str(&text[byte_end..]);

    let replacement_len = char_len(replacement);
    let delta = replacement_len as isize - (end - start) as isize;

    let next_issues = issues
        .iter()
        .map(|issue| {
            if issue.id == issue_id {
                let mut applied = issue.clone();
                applied.status = IssueStatus::Applied;
                applied.position = Position {
                    start,
                    end: start + replacement_len,
                };
                return applied;
            }
            if !issue.is_pending() || issue.position.start < end {
                return issue.clone();
            }
            // Entirely after the edited span: shift both ends. start >= end
            // of the splice, so adding delta cannot underflow.
            let mut shifted = issue.clone();
            shifted.position = Position {
                start: (issue.position.start as isize + delta) as usize,
                end: (issue.position.end as isize + delta) as usize,
            };
            shifted
        })
        .collect();

    Some((next, next_issues))
}

/// Sort by start and drop any issue whose range intersects an earlier one.
fn reconcile(issues: &[Issue]) -> Vec<SessionIssue> {
    let mut order: Vec<usize> = (0..issues.len()).collect();
    order.sort_by_key(|&i| issues[i].position.start);

    let mut keep = vec![false; issues.len()];
    let mut last_end: Option<usize> = None;
    for &i in &order {
        let position = issues[i].position;
        if position.end < position.start {
            continue;
        }
        if last_end.map_or(true, |end| position.start >= end) {
            keep[i] = true;
            last_end = Some(position.end);
        }
    }

    issues
        .iter()
        .enumerate()
        .filter(|(i, _)| keep[*i])
        .map(|(i, issue)| SessionIssue {
            id: i,
            kind: issue.kind,
            original: issue.original.clone(),
            message: issue.message.clone(),
            suggestions: issue.suggestions.clone(),
            position: issue.position,
            status: IssueStatus::Pending,
        })
        .collect()
}
