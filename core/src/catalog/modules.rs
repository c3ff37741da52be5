//! Module registry
//!
//! Static table of the STT, LLM, V2V, TTS and tool extensions a graph can be
//! wired from, plus which tools each LLM-like module can drive.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of module a graph node can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    /// Speech to text
    Stt,
    /// Large language model
    Llm,
    /// Voice to voice (realtime) model
    V2v,
    /// Text to speech
    Tts,
    /// Tool callable by an LLM
    Tool,
}

impl ModuleType {
    /// Section label; tools have none since they hang off an LLM
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ModuleType::Stt => Some("STT（语音转文字）"),
            ModuleType::Llm => Some("LLM（大语言模型）"),
            ModuleType::Tts => Some("TTS（文字转语音）"),
            ModuleType::V2v => Some("LLM v2v（语音到语音）"),
            ModuleType::Tool => None,
        }
    }
}

/// Input modality accepted by an LLM or V2V module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Camera or screen frames
    Video,
    /// Raw audio
    Audio,
    /// Text
    Text,
}

/// A registered module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Extension name as it appears in graph definitions
    pub name: &'static str,
    /// Module kind
    pub module_type: ModuleType,
    /// Display label
    pub label: &'static str,
    /// Input modalities (LLM and V2V only)
    pub input_modalities: &'static [Modality],
    /// Whether tool output is returned as content text (tools only)
    pub output_content_text: bool,
}

const fn module(name: &'static str, module_type: ModuleType, label: &'static str) -> Module {
    Module {
        name,
        module_type,
        label,
        input_modalities: &[],
        output_content_text: false,
    }
}

const fn model(
    name: &'static str,
    module_type: ModuleType,
    label: &'static str,
    input_modalities: &'static [Modality],
) -> Module {
    Module {
        name,
        module_type,
        label,
        input_modalities,
        output_content_text: false,
    }
}

const fn tool(name: &'static str, label: &'static str, output_content_text: bool) -> Module {
    Module {
        name,
        module_type: ModuleType::Tool,
        label,
        input_modalities: &[],
        output_content_text,
    }
}

const TEXT: &[Modality] = &[Modality::Text];
const AUDIO: &[Modality] = &[Modality::Audio];

static MODULES: &[Module] = &[
    module("deepgram_asr_python", ModuleType::Stt, "Deepgram 语音识别"),
    module("transcribe_asr_python", ModuleType::Stt, "Transcribe 语音识别"),
    module("speechmatics_asr_python", ModuleType::Stt, "Speechmatics 语音识别"),
    model("openai_chatgpt_python", ModuleType::Llm, "OpenAI ChatGPT", TEXT),
    model("dify_python", ModuleType::Llm, "Dify 聊天机器人", TEXT),
    model("coze_python_async", ModuleType::Llm, "Coze 聊天机器人", TEXT),
    model("gemini_llm_python", ModuleType::Llm, "Gemini 大模型", TEXT),
    model(
        "bedrock_llm_python",
        ModuleType::Llm,
        "Bedrock 大模型",
        &[Modality::Text, Modality::Video],
    ),
    module("azure_tts", ModuleType::Tts, "Azure 语音合成"),
    module("cartesia_tts", ModuleType::Tts, "Cartesia 语音合成"),
    module("cosy_tts_python", ModuleType::Tts, "Cosy 语音合成"),
    module("elevenlabs_tts_python", ModuleType::Tts, "Elevenlabs 语音合成"),
    module("fish_audio_tts_python", ModuleType::Tts, "Fish Audio 语音合成"),
    module("minimax_tts_python", ModuleType::Tts, "Minimax 语音合成"),
    module("polly_tts", ModuleType::Tts, "Polly 语音合成"),
    module("neuphonic_tts", ModuleType::Tts, "Neuphonic 语音合成"),
    module("openai_tts_python", ModuleType::Tts, "OpenAI 语音合成"),
    module("dubverse_tts", ModuleType::Tts, "Dubverse 语音合成"),
    model("openai_v2v_python", ModuleType::V2v, "OpenAI 实时对话", AUDIO),
    model(
        "gemini_v2v_python",
        ModuleType::V2v,
        "Gemini 实时对话",
        &[Modality::Video, Modality::Audio],
    ),
    model("glm_v2v_python", ModuleType::V2v, "GLM 实时对话", AUDIO),
    model("stepfun_v2v_python", ModuleType::V2v, "Stepfun 实时对话", AUDIO),
    model("azure_v2v_python", ModuleType::V2v, "Azure 实时对话", AUDIO),
    tool("vision_analyze_tool_python", "视觉分析工具", false),
    tool("weatherapi_tool_python", "天气查询工具", false),
    tool("bingsearch_tool_python", "Bing 搜索工具", false),
    tool("vision_tool_python", "视觉工具", false),
    tool("openai_image_generate_tool", "OpenAI 图像生成工具", true),
    tool("computer_tool_python", "计算机工具", true),
    tool("mcp_client_python", "MCP 客户端工具", false),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static Module>> =
    Lazy::new(|| MODULES.iter().map(|m| (m.name, m)).collect());

static COMPATIBLE_TOOLS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    const REALTIME_BASE: [&str; 4] = [
        "weatherapi_tool_python",
        "bingsearch_tool_python",
        "openai_image_generate_tool",
        "computer_tool_python",
    ];
    let with_mcp = |base: &[&'static str]| {
        let mut tools = base.to_vec();
        tools.push("mcp_client_python");
        tools
    };

    let mut table = HashMap::new();
    let mut chatgpt = vec!["vision_tool_python"];
    chatgpt.extend(with_mcp(&REALTIME_BASE));
    table.insert("openai_chatgpt_python", chatgpt);
    table.insert("openai_v2v_python", with_mcp(&REALTIME_BASE));
    table.insert("gemini_v2v_python", REALTIME_BASE.to_vec());
    table.insert("glm_v2v_python", REALTIME_BASE.to_vec());
    table.insert("stepfun_v2v_python", with_mcp(&REALTIME_BASE));
    table.insert("azure_v2v_python", with_mcp(&REALTIME_BASE));
    table
});

/// Look up a module by extension name
pub fn find_module(name: &str) -> Option<&'static Module> {
    BY_NAME.get(name).copied()
}

/// Modules of one kind, in registry order
pub fn modules_of_type(module_type: ModuleType) -> impl Iterator<Item = &'static Module> {
    MODULES.iter().filter(move |m| m.module_type == module_type)
}

/// Tools the given LLM/V2V module can call; empty for anything else
pub fn compatible_tools(module_name: &str) -> Vec<&'static Module> {
    COMPATIBLE_TOOLS
        .get(module_name)
        .map(|names| names.iter().filter_map(|n| find_module(n)).collect())
        .unwrap_or_default()
}
