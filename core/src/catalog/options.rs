//! Selectable session options
//!
//! Languages, voice types and the default graph list offered by the
//! playground. Wire values match what the agent server expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language the agent listens and speaks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English (US)
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    /// Simplified Chinese
    #[serde(rename = "zh-CN")]
    ZhCn,
    /// Korean
    #[serde(rename = "ko-KR")]
    KoKr,
    /// Japanese
    #[serde(rename = "ja-JP")]
    JaJp,
}

impl Language {
    /// All languages in display order
    pub const ALL: [Language; 4] = [
        Language::EnUs,
        Language::ZhCn,
        Language::KoKr,
        Language::JaJp,
    ];

    /// Wire value, e.g. `"en-US"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::ZhCn => "zh-CN",
            Language::KoKr => "ko-KR",
            Language::JaJp => "ja-JP",
        }
    }

    /// Label shown in the language selector
    pub fn label(&self) -> &'static str {
        match self {
            Language::EnUs => "英语",
            Language::ZhCn => "中文（简体）",
            Language::KoKr => "韩语",
            Language::JaJp => "日语",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported language: {}", s))
    }
}

/// Voice used by the TTS module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceType {
    /// Male voice
    #[default]
    Male,
    /// Female voice
    Female,
}

impl VoiceType {
    /// All voice types in display order
    pub const ALL: [VoiceType; 2] = [VoiceType::Male, VoiceType::Female];

    /// Wire value, e.g. `"male"`
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceType::Male => "male",
            VoiceType::Female => "female",
        }
    }

    /// Label shown in the voice selector
    pub fn label(&self) -> &'static str {
        match self {
            VoiceType::Male => "男声",
            VoiceType::Female => "女声",
        }
    }
}

impl fmt::Display for VoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(VoiceType::Male),
            "female" => Ok(VoiceType::Female),
            _ => Err(format!("unsupported voice type: {}", s)),
        }
    }
}

/// A graph the user can pick before connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphOption {
    /// Stable identifier used for selection
    pub graph_id: String,
    /// Graph name sent to the agent server on start
    pub name: String,
    /// Human-readable label
    pub label: String,
}

impl GraphOption {
    /// Create a graph option whose id equals its name
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            graph_id: name.to_string(),
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

/// Graphs offered when the server list has not been loaded
pub fn default_graphs() -> Vec<GraphOption> {
    vec![
        GraphOption::new("va_openai_azure", "语音助手 - OpenAI LLM + Azure TTS"),
        GraphOption::new(
            "camera_va_openai_azure",
            "语音助手（含视觉）- OpenAI LLM + Azure TTS",
        ),
    ]
}

/// Character description shown in the action bar
pub const DESCRIPTION: &str = "一位基于尖端人工智能与深度学习技术打造的居家智能陪护助手。不是替代人类情感连接，而是提供补充性的支持、信息与温和陪伴。";
