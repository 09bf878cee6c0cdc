//! Document-wide heading analysis.
//!
//! The style-only rule in the writer trusts `heading_level` per paragraph.
//! The analyzer looks at the whole document instead: it recognizes Korean
//! chapter markers (`제1장`, `제2절`, `Ⅱ.`) on body paragraphs, turns runs
//! of consecutively numbered headings (`1.`, `2.` or `가.`, `나.`) back into
//! plain paragraphs, and shifts levels so the shallowest heading lands on a
//! fixed level.
//!
//! ```rust
//! use unhwp::markdown::{HeadingConfig, RenderOptions, ToMarkdown};
//! use unhwp::model::{Document, Paragraph, Section};
//!
//! let mut section = Section::new(0);
//! section.push_paragraph(Paragraph::text("제1장 총칙"));
//! section.push_paragraph(Paragraph::text("본문"));
//! let mut document = Document::new();
//! document.sections.push(section);
//!
//! let options = RenderOptions::new().with_heading_analysis(HeadingConfig::default());
//! let markdown = document.to_markdown_with_options(&options).unwrap();
//! assert!(markdown.starts_with("## 제1장 총칙\n"));
//! ```

use crate::model::{Block, Document, Paragraph};
use once_cell::sync::Lazy;
use regex::Regex;

/// `가나다` enumeration order used by Korean outlines.
const KOREAN_SEQUENCE: &[char] = &[
    '가', '나', '다', '라', '마', '바', '사', '아', '자', '차', '카', '타', '파', '하',
];

/// Leading characters of bulleted paragraphs; never headings.
const BULLET_MARKERS: &[char] = &[
    'ㅇ', 'ㆍ', '○', '●', '◎', '■', '□', '▪', '▫', '◆', '◇', '★', '☆', '※', '•', '-', '–', '—',
    '→', '▶', '►', '▷', '▹', '◁', '◀', '◃', '◂', '·', '∙',
];

/// `1.`, `2)`, `(3)`, `가.`, `(나)`, `a)`
static RE_SEQUENCE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\((\d+|[a-z]|[가나다라마바사아자차카타파하])\)|(\d+|[a-z]|[가나다라마바사아자차카타파하])[.)])",
    )
    .expect("valid sequence marker regex")
});

/// `제1장`, `제12조`, `제3편 ...`
static RE_KOREAN_CHAPTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^제(\d+)(장|절|조|항|편|부)").expect("valid chapter marker regex")
});

/// `Ⅰ.`, `Ⅱ-`, `Ⅲ 본론`, or a lone numeral
static RE_ROMAN_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([Ⅰ-Ⅹ])(?:[.\-\s]|$)").expect("valid roman marker regex"));

/// Configuration for [`HeadingAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingConfig {
    /// Deepest level emitted; deeper headings are capped
    pub max_heading_level: u8,
    /// Paragraphs with more characters than this are never headings
    pub max_text_length: usize,
    /// Accept style headings without consulting chapter markers
    pub trust_explicit_styles: bool,
    /// Infer headings from Korean chapter markers on body paragraphs
    pub detect_chapter_patterns: bool,
    /// Demote runs of consecutively numbered headings
    pub analyze_sequences: bool,
    /// Shortest run treated as a list (at least 2)
    pub min_sequence_count: usize,
    /// Shift levels so the shallowest heading becomes `normalize_min_level`
    pub normalize_levels: bool,
    pub normalize_min_level: u8,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            max_heading_level: 4,
            max_text_length: 80,
            trust_explicit_styles: true,
            detect_chapter_patterns: true,
            analyze_sequences: true,
            min_sequence_count: 2,
            normalize_levels: true,
            normalize_min_level: 2,
        }
    }
}

impl HeadingConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels outside 1..=6 are clamped.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    pub fn with_max_text_length(mut self, length: usize) -> Self {
        self.max_text_length = length;
        self
    }

    pub fn with_trust_explicit(mut self, trust: bool) -> Self {
        self.trust_explicit_styles = trust;
        self
    }

    pub fn with_chapter_patterns(mut self, detect: bool) -> Self {
        self.detect_chapter_patterns = detect;
        self
    }

    pub fn with_sequence_analysis(mut self, analyze: bool) -> Self {
        self.analyze_sequences = analyze;
        self
    }

    pub fn with_min_sequence_count(mut self, count: usize) -> Self {
        self.min_sequence_count = count.max(2);
        self
    }

    pub fn with_normalize_levels(mut self, normalize: bool) -> Self {
        self.normalize_levels = normalize;
        self
    }

    /// Target level after normalization, clamped to 1..=3.
    pub fn with_normalize_min_level(mut self, level: u8) -> Self {
        self.normalize_min_level = level.clamp(1, 3);
        self
    }
}

/// Outcome of the analysis for one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingDecision {
    /// Heading from the paragraph style
    Explicit(u8),
    /// Heading inferred from a chapter marker
    Inferred(u8),
    /// Styled as a heading but rendered as body text
    Demoted,
    None,
}

impl HeadingDecision {
    #[inline]
    pub fn is_heading(&self) -> bool {
        self.level().is_some()
    }

    pub fn level(&self) -> Option<u8> {
        match *self {
            HeadingDecision::Explicit(level) | HeadingDecision::Inferred(level) => Some(level),
            HeadingDecision::Demoted | HeadingDecision::None => None,
        }
    }

    fn with_level(self, level: u8) -> Self {
        match self {
            HeadingDecision::Explicit(_) => HeadingDecision::Explicit(level),
            HeadingDecision::Inferred(_) => HeadingDecision::Inferred(level),
            other => other,
        }
    }
}

/// Korean chapter marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterKind {
    /// 편
    Part,
    /// 부
    Division,
    /// 장
    Chapter,
    /// 절
    Section,
    /// 조
    Article,
    /// 항
    Clause,
    /// Ⅰ through Ⅹ
    Roman,
}

impl ChapterKind {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "편" => Some(ChapterKind::Part),
            "부" => Some(ChapterKind::Division),
            "장" => Some(ChapterKind::Chapter),
            "절" => Some(ChapterKind::Section),
            "조" => Some(ChapterKind::Article),
            "항" => Some(ChapterKind::Clause),
            _ => None,
        }
    }

    pub fn heading_level(&self) -> u8 {
        match self {
            ChapterKind::Part | ChapterKind::Division => 1,
            ChapterKind::Chapter | ChapterKind::Roman => 2,
            ChapterKind::Section => 3,
            ChapterKind::Article | ChapterKind::Clause => 4,
        }
    }
}

/// A recognized chapter marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterMarker {
    pub kind: ChapterKind,
    pub number: u32,
}

/// Recognize a Korean chapter marker at the start of `text`.
pub fn chapter_marker(text: &str) -> Option<ChapterMarker> {
    let text = text.trim();
    if let Some(caps) = RE_KOREAN_CHAPTER.captures(text) {
        let number = caps[1].parse().ok()?;
        let kind = ChapterKind::from_suffix(&caps[2])?;
        return Some(ChapterMarker { kind, number });
    }
    let caps = RE_ROMAN_CHAPTER.captures(text)?;
    let numeral = caps[1].chars().next()?;
    Some(ChapterMarker {
        kind: ChapterKind::Roman,
        number: numeral as u32 - 'Ⅰ' as u32 + 1,
    })
}

/// Enumeration marker at the start of `text`, without its punctuation.
fn sequence_marker(text: &str) -> Option<&str> {
    let caps = RE_SEQUENCE_MARKER.captures(text.trim_start())?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// The marker expected after `marker`, or `None` at the end of an alphabet.
fn next_marker(marker: &str) -> Option<String> {
    if let Ok(n) = marker.parse::<u32>() {
        return n.checked_add(1).map(|n| n.to_string());
    }
    let mut chars = marker.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if let Some(idx) = KOREAN_SEQUENCE.iter().position(|&k| k == c) {
        return KOREAN_SEQUENCE.get(idx + 1).map(|k| k.to_string());
    }
    if c.is_ascii_lowercase() && c != 'z' {
        return Some(char::from(c as u8 + 1).to_string());
    }
    None
}

/// Heading analysis over a whole document.
#[derive(Debug, Clone, Default)]
pub struct HeadingAnalyzer {
    config: HeadingConfig,
}

impl HeadingAnalyzer {
    pub fn new(config: HeadingConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    /// One decision per top-level paragraph, in document order. Tables are
    /// skipped.
    pub fn analyze(&self, document: &Document) -> Vec<HeadingDecision> {
        let paragraphs: Vec<&Paragraph> = document
            .sections
            .iter()
            .flat_map(|section| section.content.iter())
            .filter_map(|block| match block {
                Block::Paragraph(para) => Some(para),
                Block::Table(_) => None,
            })
            .collect();
        self.analyze_paragraphs(&paragraphs)
    }

    pub fn analyze_paragraphs(&self, paragraphs: &[&Paragraph]) -> Vec<HeadingDecision> {
        let texts: Vec<String> = paragraphs.iter().map(|p| p.plain_text()).collect();
        let mut decisions: Vec<HeadingDecision> = paragraphs
            .iter()
            .zip(&texts)
            .map(|(para, text)| self.decide(para, text.trim()))
            .collect();

        if self.config.analyze_sequences {
            self.demote_sequences(&texts, &mut decisions);
        }
        if self.config.normalize_levels {
            self.normalize(&mut decisions);
        }
        decisions
    }

    fn decide(&self, para: &Paragraph, text: &str) -> HeadingDecision {
        let styled = para.style.is_heading();
        let excluded = text.starts_with(BULLET_MARKERS)
            || text.chars().count() > self.config.max_text_length;
        if excluded {
            return if styled {
                HeadingDecision::Demoted
            } else {
                HeadingDecision::None
            };
        }

        if styled && self.config.trust_explicit_styles {
            return HeadingDecision::Explicit(self.cap(para.style.heading_level));
        }
        if self.config.detect_chapter_patterns && !para.style.is_list_item() {
            if let Some(marker) = chapter_marker(text) {
                return HeadingDecision::Inferred(self.cap(marker.kind.heading_level()));
            }
        }
        if styled {
            return HeadingDecision::Explicit(self.cap(para.style.heading_level));
        }
        HeadingDecision::None
    }

    #[inline]
    fn cap(&self, level: u8) -> u8 {
        level.clamp(1, self.config.max_heading_level.max(1))
    }

    /// Runs of paragraphs numbered `n, n+1, ...` are list items, not
    /// headings.
    fn demote_sequences(&self, texts: &[String], decisions: &mut [HeadingDecision]) {
        let min = self.config.min_sequence_count.max(2);
        let mut i = 0;
        while i < texts.len() {
            let run = sequence_run(texts, i);
            if run >= min {
                for decision in &mut decisions[i..i + run] {
                    if decision.is_heading() {
                        *decision = HeadingDecision::Demoted;
                    }
                }
                i += run;
            } else {
                i += 1;
            }
        }
    }

    fn normalize(&self, decisions: &mut [HeadingDecision]) {
        let Some(min_level) = decisions.iter().filter_map(HeadingDecision::level).min() else {
            return;
        };
        let target = self.config.normalize_min_level;
        if min_level <= target {
            return;
        }
        let shift = min_level - target;
        for decision in decisions.iter_mut() {
            if let Some(level) = decision.level() {
                *decision = decision.with_level(level.saturating_sub(shift).max(1));
            }
        }
    }
}

/// Length of the numbered run starting at `start`; 0 when `start` carries
/// no marker.
fn sequence_run(texts: &[String], start: usize) -> usize {
    let Some(first) = sequence_marker(&texts[start]) else {
        return 0;
    };
    let mut run = 1;
    let mut expected = next_marker(first);
    for text in &texts[start + 1..] {
        match (sequence_marker(text), expected.as_deref()) {
            (Some(marker), Some(want)) if marker == want => {
                run += 1;
                expected = next_marker(marker);
            },
            _ => break,
        }
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListStyle, ParagraphStyle, Section};

    fn para(text: &str, level: u8) -> Paragraph {
        let mut para = Paragraph::text(text);
        para.style = ParagraphStyle::heading(level);
        para
    }

    fn decide(config: HeadingConfig, paragraphs: &[Paragraph]) -> Vec<HeadingDecision> {
        let refs: Vec<&Paragraph> = paragraphs.iter().collect();
        HeadingAnalyzer::new(config).analyze_paragraphs(&refs)
    }

    fn plain() -> HeadingConfig {
        HeadingConfig::default()
            .with_normalize_levels(false)
            .with_max_level(6)
    }

    #[test]
    fn test_chapter_markers() {
        let m = chapter_marker("제1장 총칙").unwrap();
        assert_eq!(m.kind, ChapterKind::Chapter);
        assert_eq!(m.number, 1);
        assert_eq!(chapter_marker("제12조(목적)").unwrap().kind, ChapterKind::Article);
        assert_eq!(chapter_marker("제3절").unwrap().kind.heading_level(), 3);
        let roman = chapter_marker("Ⅲ. 본론").unwrap();
        assert_eq!((roman.kind, roman.number), (ChapterKind::Roman, 3));
        assert!(chapter_marker("Ⅱ").is_some());
        assert!(chapter_marker("제목 없음").is_none());
        assert!(chapter_marker("제1회 회의").is_none());
        assert!(chapter_marker("Ⅳ장").is_none());
    }

    #[test]
    fn test_sequence_markers() {
        assert_eq!(sequence_marker("1. 항목"), Some("1"));
        assert_eq!(sequence_marker("2) 항목"), Some("2"));
        assert_eq!(sequence_marker("(3) 항목"), Some("3"));
        assert_eq!(sequence_marker("가. 항목"), Some("가"));
        assert_eq!(sequence_marker("(나) 항목"), Some("나"));
        assert_eq!(sequence_marker("a. item"), Some("a"));
        assert_eq!(sequence_marker("일반 텍스트"), None);
        assert_eq!(sequence_marker("2024년"), None);

        assert_eq!(next_marker("9").as_deref(), Some("10"));
        assert_eq!(next_marker("가").as_deref(), Some("나"));
        assert_eq!(next_marker("a").as_deref(), Some("b"));
        assert_eq!(next_marker("하"), None);
        assert_eq!(next_marker("z"), None);
    }

    #[test]
    fn test_explicit_and_inferred() {
        let decisions = decide(
            plain(),
            &[para("개요", 1), para("제2절 범위", 0), para("본문", 0)],
        );
        assert_eq!(
            decisions,
            vec![
                HeadingDecision::Explicit(1),
                HeadingDecision::Inferred(3),
                HeadingDecision::None,
            ]
        );

        let off = decide(plain().with_chapter_patterns(false), &[para("제2절 범위", 0)]);
        assert_eq!(off, vec![HeadingDecision::None]);

        let mut listed = Paragraph::text("제1장 항목");
        listed.style = ParagraphStyle::list(ListStyle::Unordered, 0);
        assert_eq!(decide(plain(), &[listed]), vec![HeadingDecision::None]);
    }

    #[test]
    fn test_exclusions() {
        let long = "가".repeat(81);
        let decisions = decide(plain(), &[para("ㅇ 항목", 2), para(&long, 1), para("• 점", 0)]);
        assert_eq!(
            decisions,
            vec![
                HeadingDecision::Demoted,
                HeadingDecision::Demoted,
                HeadingDecision::None,
            ]
        );
    }

    #[test]
    fn test_consecutive_numbers_demoted() {
        let decisions = decide(
            plain(),
            &[
                para("1. 첫째", 2),
                para("2. 둘째", 2),
                para("3. 셋째", 2),
                para("가. 단독", 2),
                para("본문", 0),
                para("4. 결론", 2),
            ],
        );
        assert_eq!(
            decisions,
            vec![
                HeadingDecision::Demoted,
                HeadingDecision::Demoted,
                HeadingDecision::Demoted,
                HeadingDecision::Explicit(2),
                HeadingDecision::None,
                HeadingDecision::Explicit(2),
            ]
        );

        let korean = decide(plain(), &[para("가. 하나", 3), para("나. 둘", 3)]);
        assert!(korean.iter().all(|d| *d == HeadingDecision::Demoted));

        let kept = decide(
            plain().with_sequence_analysis(false),
            &[para("1. 첫째", 2), para("2. 둘째", 2)],
        );
        assert!(kept.iter().all(HeadingDecision::is_heading));

        let longer = decide(
            plain().with_min_sequence_count(3),
            &[para("1. 첫째", 2), para("2. 둘째", 2)],
        );
        assert!(longer.iter().all(HeadingDecision::is_heading));
    }

    #[test]
    fn test_levels_normalized_and_capped() {
        let decisions = decide(
            HeadingConfig::default(),
            &[para("상위", 4), para("하위", 5), para("제1편 총론", 0)],
        );
        // Part markers infer level 1, so nothing shifts
        assert_eq!(
            decisions,
            vec![
                HeadingDecision::Explicit(4),
                HeadingDecision::Explicit(4),
                HeadingDecision::Inferred(1),
            ]
        );

        let shifted = decide(
            HeadingConfig::default().with_max_level(6),
            &[para("상위", 4), para("하위", 5)],
        );
        assert_eq!(
            shifted,
            vec![HeadingDecision::Explicit(2), HeadingDecision::Explicit(3)]
        );
    }

    #[test]
    fn test_analyze_skips_tables() {
        let mut section = Section::new(0);
        section.push_paragraph(para("제1장 서론", 0));
        section.push_table(crate::model::Table::new());
        section.push_paragraph(para("본문", 0));
        let mut document = Document::new();
        document.sections.push(section);

        let decisions = HeadingAnalyzer::default().analyze(&document);
        assert_eq!(
            decisions,
            vec![HeadingDecision::Inferred(2), HeadingDecision::None]
        );
    }
}
