use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Conversion, ConversionResult, convert_one};
use crate::error::{ConversionError, ParseError};
use crate::model::{Field, Protocol, ValidationIssue};
use crate::protocols::common::is_blank_or_comment;
use crate::protocols::oscam::section_name;

/// One record's worth of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// 1-based line of the segment's first line in the whole input.
    pub line: usize,
    pub text: Cow<'a, str>,
}

/// Batch evaluation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Fan records out to the rayon pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Outcome for one record, aligned with its input position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// 0-based position among the non-empty input records.
    pub index: usize,
    /// 1-based line where the record starts.
    pub line: usize,
    pub result: ConversionResult,
}

/// Ordered per-record outcomes plus summary counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Fixed source protocol, or `None` when each record was detected.
    pub source: Option<Protocol>,
    pub target: Protocol,
    pub succeeded: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    fn from_entries(source: Option<Protocol>, target: Protocol, entries: Vec<BatchEntry>) -> Self {
        let succeeded = entries.iter().filter(|entry| entry.result.is_ok()).count();
        Self {
            source,
            target,
            succeeded,
            failed: entries.len() - succeeded,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful conversions in input order.
    pub fn conversions(&self) -> impl Iterator<Item = &Conversion> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok())
    }

    /// Failures with their record line.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &ConversionError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().err().map(|err| (entry.line, err)))
    }

    /// Warnings of successful records with their record line.
    pub fn warnings(&self) -> impl Iterator<Item = (usize, &ValidationIssue)> {
        self.entries.iter().flat_map(|entry| {
            entry.result.iter().flat_map(move |conversion| {
                conversion
                    .warnings
                    .iter()
                    .map(move |issue| (entry.line, issue))
            })
        })
    }
}

/// Split `text` into records using `protocol`'s boundary rule.
///
/// Line formats hold one record per line. OSCam blocks start at a `[section]`
/// header and end at a blank line or the next header; lines outside any block
/// form their own segment so they are reported rather than lost. Blank and
/// comment lines never produce a segment.
///
/// # Examples
/// ```
/// use camconv_core::{Protocol, split_records};
///
/// let segments = split_records("# list\nC: a 1 u p\n\nC: b 2 u p\n", Protocol::Cccam);
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[1].line, 4);
/// ```
pub fn split_records(text: &str, protocol: Protocol) -> Vec<Segment<'_>> {
    if protocol.is_line_format() {
        return text
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_blank_or_comment(line))
            .map(|(idx, line)| borrowed(idx, line))
            .collect();
    }

    let mut segments = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            segments.extend(take_block(&mut current));
            continue;
        }
        if section_name(line).is_some() {
            segments.extend(take_block(&mut current));
            current = Some((idx + 1, vec![line]));
            continue;
        }
        match current.as_mut() {
            Some((_, lines)) => lines.push(line),
            None if is_blank_or_comment(line) => {}
            None => current = Some((idx + 1, vec![line])),
        }
    }
    segments.extend(take_block(&mut current));
    segments
}

/// Split mixed-protocol `text`, tagging each segment with its detected
/// protocol.
///
/// Keyword lines are records of their own; a `[section]` header opens an
/// OSCam block that runs until a blank line, the next header or the next
/// keyword line. Lines outside any block that announce no protocol form an
/// untagged segment.
///
/// # Examples
/// ```
/// use camconv_core::{Protocol, split_detected};
///
/// let segments = split_detected("C: a 1 u p\n[reader]\ndevice = b,2\nN: c 3 u p\n");
/// let tags: Vec<_> = segments.iter().map(|(protocol, _)| *protocol).collect();
/// assert_eq!(
///     tags,
///     vec![Some(Protocol::Cccam), Some(Protocol::Oscam), Some(Protocol::Newcamd)]
/// );
/// assert_eq!(segments[1].1.text, "[reader]\ndevice = b,2");
/// ```
pub fn split_detected(text: &str) -> Vec<(Option<Protocol>, Segment<'_>)> {
    let mut segments = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;
    let oscam_block = |block| (Some(Protocol::Oscam), block);
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            segments.extend(take_block(&mut current).map(oscam_block));
            continue;
        }
        match Protocol::detect(line) {
            Some(Protocol::Oscam) => {
                segments.extend(take_block(&mut current).map(oscam_block));
                current = Some((idx + 1, vec![line]));
            }
            Some(protocol) => {
                segments.extend(take_block(&mut current).map(oscam_block));
                segments.push((Some(protocol), borrowed(idx, line)));
            }
            None => match current.as_mut() {
                Some((_, lines)) => lines.push(line),
                None if is_blank_or_comment(line) => {}
                None => segments.push((None, borrowed(idx, line))),
            },
        }
    }
    segments.extend(take_block(&mut current).map(oscam_block));
    segments
}

fn borrowed(idx: usize, line: &str) -> Segment<'_> {
    Segment {
        line: idx + 1,
        text: Cow::Borrowed(line),
    }
}

fn take_block<'a>(current: &mut Option<(usize, Vec<&'a str>)>) -> Option<Segment<'a>> {
    current.take().map(|(line, lines)| Segment {
        line,
        text: Cow::Owned(lines.join("\n")),
    })
}

/// Convert every record of `text`; failures never abort the batch.
pub fn convert_batch(text: &str, source: Protocol, target: Protocol) -> BatchResult {
    convert_batch_with(text, source, target, &BatchOptions::default())
}

pub fn convert_batch_with(
    text: &str,
    source: Protocol,
    target: Protocol,
    options: &BatchOptions,
) -> BatchResult {
    let segments: Vec<_> = split_records(text, source)
        .into_iter()
        .map(|segment| (Some(source), segment))
        .collect();
    debug!(
        %source,
        %target,
        records = segments.len(),
        parallel = options.parallel,
        "converting batch"
    );
    run_segments(&segments, Some(source), target, options)
}

/// Convert every record of mixed-protocol `text`, detecting each record's
/// source from its keyword or section header.
///
/// Records announcing no protocol fail with a keyword error on their line.
///
/// # Examples
/// ```
/// use camconv_core::{Protocol, convert_batch_auto};
///
/// let batch = convert_batch_auto("C: a 12000 u p\nN: b 15000 u p\nhello\n", Protocol::Mgcamd);
/// assert_eq!((batch.succeeded, batch.failed), (2, 1));
/// assert_eq!(batch.source, None);
/// ```
pub fn convert_batch_auto(text: &str, target: Protocol) -> BatchResult {
    convert_batch_auto_with(text, target, &BatchOptions::default())
}

pub fn convert_batch_auto_with(
    text: &str,
    target: Protocol,
    options: &BatchOptions,
) -> BatchResult {
    let segments = split_detected(text);
    debug!(
        %target,
        records = segments.len(),
        parallel = options.parallel,
        "converting mixed batch"
    );
    run_segments(&segments, None, target, options)
}

fn run_segments(
    segments: &[(Option<Protocol>, Segment<'_>)],
    source: Option<Protocol>,
    target: Protocol,
    options: &BatchOptions,
) -> BatchResult {
    let convert = |(index, (detected, segment)): (usize, &(Option<Protocol>, Segment<'_>))| {
        let result = match detected {
            Some(protocol) => convert_one(&segment.text, *protocol, target),
            None => Err(undetected(&segment.text)),
        };
        BatchEntry {
            index,
            line: segment.line,
            result: result.map_err(|err| err.rebase_line(segment.line - 1)),
        }
    };
    let entries: Vec<BatchEntry> = if options.parallel {
        segments.par_iter().enumerate().map(convert).collect()
    } else {
        segments.iter().enumerate().map(convert).collect()
    };

    let result = BatchResult::from_entries(source, target, entries);
    debug!(
        succeeded = result.succeeded,
        failed = result.failed,
        "batch finished"
    );
    result
}

fn undetected(text: &str) -> ConversionError {
    let column = text.chars().take_while(|c| c.is_whitespace()).count() + 1;
    ParseError::new(
        Field::Keyword,
        "expected a `C:`, `N:` or `M:` line or a `[section]` header",
        1,
        column,
    )
    .into()
}
