//! Render models for audit verdicts and document cards. Built on read, never
//! stored.

use std::fmt;

use shared::domain::{AuditVerdict, DocumentRecord, Severity};

use crate::format::format_result;

pub const FLAGGED_ITEMS_DELIMITER: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Positive,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceBadge {
    pub label: String,
    pub tone: BadgeTone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationBlock {
    pub rule_name: String,
    pub message: String,
    pub severity: Severity,
    pub flagged_items: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub warning: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRender {
    pub badge: ComplianceBadge,
    pub summary: String,
    pub violations: Vec<ViolationBlock>,
}

impl AuditRender {
    /// Per-severity tally for the grouped summary line; block order is left
    /// as received.
    pub fn severity_counts(&self) -> SeverityCounts {
        self.violations
            .iter()
            .fold(SeverityCounts::default(), |mut counts, block| {
                match block.severity {
                    Severity::High => counts.high += 1,
                    Severity::Medium => counts.medium += 1,
                    Severity::Warning => counts.warning += 1,
                }
                counts
            })
    }
}

pub fn render_audit(verdict: Option<&AuditVerdict>) -> Option<AuditRender> {
    let verdict = verdict?;
    let tone = if verdict.is_compliant {
        BadgeTone::Positive
    } else {
        BadgeTone::Warning
    };

    let violations = verdict
        .violations
        .iter()
        .map(|violation| ViolationBlock {
            rule_name: violation.rule_name.clone(),
            message: violation.message.clone(),
            severity: violation.severity,
            flagged_items: (!violation.flagged_items.is_empty())
                .then(|| violation.flagged_items.join(FLAGGED_ITEMS_DELIMITER)),
        })
        .collect();

    Some(AuditRender {
        badge: ComplianceBadge {
            label: format!("{}% Compliant", format_score(verdict.compliance_score)),
            tone,
        },
        summary: verdict.summary.clone(),
        violations,
    })
}

/// Clamps to [0, 100]; whole numbers print without decimals, others with at
/// most two.
pub fn format_score(score: f64) -> String {
    let score = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    };
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        let rounded = format!("{score:.2}");
        rounded.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl fmt::Display for AuditRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.badge.tone {
            BadgeTone::Positive => "[ok]",
            BadgeTone::Warning => "[!]",
        };
        writeln!(f, "Audit Result {marker} {}", self.badge.label)?;
        if !self.summary.is_empty() {
            writeln!(f, "{}", self.summary)?;
        }
        if self.violations.is_empty() {
            return Ok(());
        }

        let counts = self.severity_counts();
        writeln!(
            f,
            "Issues Found: {} high, {} medium, {} warning",
            counts.high, counts.medium, counts.warning
        )?;
        for block in &self.violations {
            writeln!(f, "  - [{}] {}", block.severity.label(), block.rule_name)?;
            if !block.message.is_empty() {
                writeln!(f, "    {}", block.message)?;
            }
            if let Some(items) = &block.flagged_items {
                writeln!(f, "    Flagged items: {items}")?;
            }
        }
        Ok(())
    }
}

/// Detailed card shown under a system event that carries a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub filename: String,
    pub file_type: String,
    pub duplicate: bool,
    pub analysis: String,
    pub audit: Option<AuditRender>,
}

impl DocumentView {
    pub fn from_record(record: &DocumentRecord) -> Self {
        Self {
            filename: record.original_filename.clone(),
            file_type: record.file_type.clone(),
            duplicate: record.is_duplicate,
            analysis: format_result(record.extracted_text.as_deref()),
            audit: render_audit(record.audit_result.as_ref()),
        }
    }
}

impl fmt::Display for DocumentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.filename)?;
        writeln!(f, "Type: {}", self.file_type)?;
        if self.duplicate {
            writeln!(f, "Duplicate detected")?;
        }
        if !self.analysis.is_empty() {
            writeln!(f, "AI Analysis:")?;
            for line in self.analysis.lines() {
                writeln!(f, "  {line}")?;
            }
        }
        if let Some(audit) = &self.audit {
            write!(f, "{audit}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntryView {
    pub filename: String,
    pub subtitle: String,
    pub duplicate: bool,
    pub selected: bool,
}

impl HistoryEntryView {
    pub fn from_record(record: &DocumentRecord, selected: bool) -> Self {
        Self {
            filename: record.original_filename.clone(),
            subtitle: format!(
                "{} • {}",
                record.file_type,
                record.created_at.format("%Y-%m-%d")
            ),
            duplicate: record.is_duplicate,
            selected,
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
