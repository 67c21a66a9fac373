//! Workflow metadata extraction from PNG text chunks.
//!
//! PNG chunks are parsed natively: 4-byte length (big-endian), 4-byte type,
//! `length` bytes of data, 4-byte CRC. tEXt chunks use keyword\0value format;
//! iTXt chunks carry keyword\0compression_flag\0compression_method\0language\0
//! translated_keyword\0text. CRCs are skipped, not validated; a damaged chunk
//! at worst yields a blob that fails JSON decode and is treated as missing.
//!
//! The value found under a recognized keyword is expected to be a serialized
//! ComfyUI workflow graph: a JSON object mapping node id to a node object
//! with `class_type` and `inputs`. Only metadata is read here; pixel data is
//! never decoded.

use crate::models::{ExtractionStatus, LoraEntry, WorkflowMetadata};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// PNG file signature (8 bytes).
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Metadata slots probed in priority order. Different producers embed the
/// workflow under different keys; the first slot that parses wins.
const METADATA_KEYS: [&str; 4] = ["prompt", "parameters", "workflow", "extra_pnginfo"];

/// Chunks larger than this are skipped rather than buffered. Workflow blobs
/// are tens of kilobytes; anything bigger is pixel data or garbage.
const MAX_TEXT_CHUNK_LEN: u32 = 16 * 1024 * 1024;

/// Extract workflow metadata from an image file.
///
/// Never fails: unreadable files, non-PNG containers, and unparsable blobs
/// all yield an empty record with [`ExtractionStatus::MetadataMissing`] so
/// batch processing can continue.
pub fn extract(path: &Path) -> (WorkflowMetadata, ExtractionStatus) {
    let chunks = match read_text_chunks(path) {
        Ok(chunks) => chunks,
        Err(err) => {
            log::debug!("Text chunk read failed for {}: {err}", path.display());
            return (WorkflowMetadata::default(), ExtractionStatus::MetadataMissing);
        }
    };

    for key in METADATA_KEYS {
        if let Some(raw) = chunks.get(key) {
            if let Some(meta) = decode_workflow(raw) {
                log::trace!("Metadata slot '{key}' parsed for {}", path.display());
                return (meta, ExtractionStatus::Extracted);
            }
            log::debug!(
                "Metadata slot '{key}' present but unparsable for {}",
                path.display()
            );
        }
    }

    (WorkflowMetadata::default(), ExtractionStatus::MetadataMissing)
}

/// Read all tEXt and iTXt chunks from a PNG file into a keyword -> value map.
///
/// Non-PNG files return an empty map rather than an error; only real I/O
/// failures propagate.
pub fn read_text_chunks(path: &Path) -> io::Result<HashMap<String, String>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut sig = [0u8; 8];
    if reader.read_exact(&mut sig).is_err() || sig != PNG_SIGNATURE {
        return Ok(HashMap::new());
    }

    let mut chunks = HashMap::new();

    loop {
        let mut header = [0u8; 8];
        if reader.read_exact(&mut header).is_err() {
            break; // Truncated file; keep whatever parsed so far
        }
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let chunk_type = &header[4..8];

        if chunk_type == b"IEND" {
            break;
        }

        let is_text = chunk_type == b"tEXt" || chunk_type == b"iTXt";
        if is_text && length <= MAX_TEXT_CHUNK_LEN {
            let mut data = vec![0u8; length as usize];
            if reader.read_exact(&mut data).is_err() {
                break;
            }
            let parsed = if chunk_type == b"tEXt" {
                parse_text_chunk(&data)
            } else {
                parse_itxt_chunk(&data)
            };
            if let Some((keyword, value)) = parsed {
                // First occurrence of a keyword wins
                chunks.entry(keyword).or_insert(value);
            }
            // Skip CRC
            if reader.seek(SeekFrom::Current(4)).is_err() {
                break;
            }
        } else {
            // Skip data + CRC without buffering
            if reader
                .seek(SeekFrom::Current(i64::from(length) + 4))
                .is_err()
            {
                break;
            }
        }
    }

    Ok(chunks)
}

/// tEXt: keyword\0value, both Latin-1 in the standard; treated as UTF-8
/// lossy since producers in practice write UTF-8.
fn parse_text_chunk(data: &[u8]) -> Option<(String, String)> {
    let null_pos = data.iter().position(|&b| b == 0)?;
    let keyword = String::from_utf8_lossy(&data[..null_pos]).into_owned();
    let value = String::from_utf8_lossy(&data[null_pos + 1..]).into_owned();
    if keyword.is_empty() {
        return None;
    }
    Some((keyword, value))
}

/// iTXt: keyword\0compression_flag\0compression_method\0language\0
/// translated_keyword\0text. Compressed payloads are skipped.
fn parse_itxt_chunk(data: &[u8]) -> Option<(String, String)> {
    let null_pos = data.iter().position(|&b| b == 0)?;
    let keyword = String::from_utf8_lossy(&data[..null_pos]).into_owned();
    let rest = &data[null_pos + 1..];
    if rest.len() < 2 {
        return None;
    }
    let compression_flag = rest[0];
    if compression_flag != 0 {
        return None;
    }
    // Skip compression method, then language tag and translated keyword
    let mut cursor = &rest[2..];
    for _ in 0..2 {
        let pos = cursor.iter().position(|&b| b == 0)?;
        cursor = &cursor[pos + 1..];
    }
    if keyword.is_empty() {
        return None;
    }
    Some((keyword, String::from_utf8_lossy(cursor).into_owned()))
}

/// Decode a raw metadata blob as a workflow graph.
///
/// Returns `None` when the blob is not a JSON object of node entries.
pub fn decode_workflow(raw: &str) -> Option<WorkflowMetadata> {
    let graph: HashMap<String, Value> = serde_json::from_str(raw).ok()?;
    if graph.is_empty() {
        return None;
    }

    // Node ids are numeric strings in practice; visit them in numeric order
    // so "first checkpoint" / "first text encode" is deterministic.
    let mut node_ids: Vec<&String> = graph.keys().collect();
    node_ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });

    let mut meta = WorkflowMetadata::default();
    let mut base_checkpoints: Vec<String> = Vec::new();
    let mut any_checkpoints: Vec<String> = Vec::new();
    let mut recognized_any = false;

    for id in node_ids {
        let node = match decode_node(&graph[id]) {
            Some(node) => node,
            None => continue,
        };
        recognized_any = true;
        match node {
            WorkflowNode::CheckpointLoader(ckpt) => {
                if let Some(name) = ckpt.name() {
                    any_checkpoints.push(name.to_string());
                    if !ckpt.is_refiner() {
                        base_checkpoints.push(name.to_string());
                    }
                }
            }
            WorkflowNode::LoraLoader(lora) => {
                if let Some(name) = lora.lora_name {
                    meta.lora_stack.push(LoraEntry {
                        name,
                        strength: lora.strength_model.as_ref().and_then(scalar_f32).unwrap_or(1.0),
                    });
                }
            }
            WorkflowNode::Sampler(sampler) => {
                if meta.sampler_settings.is_empty() {
                    sampler.fill(&mut meta.sampler_settings);
                }
            }
            WorkflowNode::TextEncode(encode) => {
                if let Some(text) = encode.text {
                    if meta.positive_prompt.is_empty() {
                        meta.positive_prompt = text;
                    } else if meta.negative_prompt.is_empty() {
                        meta.negative_prompt = text;
                    }
                }
            }
            WorkflowNode::Unrecognized => {}
        }
    }

    if !recognized_any {
        return None;
    }

    // Prefer the first non-refiner checkpoint, fall back to any
    meta.checkpoint_name = base_checkpoints
        .into_iter()
        .next()
        .or_else(|| any_checkpoints.into_iter().next())
        .unwrap_or_default();

    Some(meta)
}

/// Known node shapes, attempted per `class_type`. Anything else falls back
/// to `Unrecognized` instead of a dynamic dictionary walk.
enum WorkflowNode {
    CheckpointLoader(CheckpointLoaderNode),
    LoraLoader(LoraLoaderNode),
    Sampler(SamplerNode),
    TextEncode(TextEncodeNode),
    Unrecognized,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    class_type: String,
    #[serde(default)]
    inputs: Value,
}

#[derive(Debug, Default, Deserialize)]
struct CheckpointLoaderNode {
    #[serde(skip)]
    class_type: String,
    ckpt_name: Option<String>,
    unet_name: Option<String>,
    refiner_ckpt: Option<Value>,
    refiner_model: Option<Value>,
    ascore: Option<Value>,
    start_at_step: Option<Value>,
    end_at_step: Option<Value>,
}

impl CheckpointLoaderNode {
    fn name(&self) -> Option<&str> {
        self.ckpt_name.as_deref().or(self.unet_name.as_deref())
    }

    /// Refiner heuristics: class/title mentions, refiner-specific inputs,
    /// or the start/end step window typical of SDXL refiner passes.
    fn is_refiner(&self) -> bool {
        self.class_type.to_ascii_lowercase().contains("refiner")
            || self.refiner_ckpt.is_some()
            || self.refiner_model.is_some()
            || self.ascore.is_some()
            || (self.start_at_step.is_some() && self.end_at_step.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct LoraLoaderNode {
    lora_name: Option<String>,
    strength_model: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SamplerNode {
    steps: Option<Value>,
    cfg: Option<Value>,
    sampler_name: Option<Value>,
    scheduler: Option<Value>,
    denoise: Option<Value>,
    seed: Option<Value>,
    noise_seed: Option<Value>,
}

impl SamplerNode {
    fn fill(&self, settings: &mut std::collections::BTreeMap<String, String>) {
        let fields: [(&str, Option<&Value>); 6] = [
            ("steps", self.steps.as_ref()),
            ("cfg", self.cfg.as_ref()),
            ("sampler_name", self.sampler_name.as_ref()),
            ("scheduler", self.scheduler.as_ref()),
            ("denoise", self.denoise.as_ref()),
            ("seed", self.seed.as_ref().or(self.noise_seed.as_ref())),
        ];
        for (name, value) in fields {
            if let Some(text) = value.and_then(scalar_string) {
                settings.insert(name.to_string(), text);
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextEncodeNode {
    text: Option<String>,
}

fn decode_node(value: &Value) -> Option<WorkflowNode> {
    let raw: RawNode = serde_json::from_value(value.clone()).ok()?;
    let node = match raw.class_type.as_str() {
        "CheckpointLoaderSimple" | "CheckpointLoader" | "UNETLoader" => {
            match serde_json::from_value::<CheckpointLoaderNode>(raw.inputs) {
                Ok(mut ckpt) => {
                    ckpt.class_type = raw.class_type;
                    WorkflowNode::CheckpointLoader(ckpt)
                }
                Err(_) => WorkflowNode::Unrecognized,
            }
        }
        ct if ct.starts_with("LoraLoader") => serde_json::from_value(raw.inputs)
            .map_or(WorkflowNode::Unrecognized, WorkflowNode::LoraLoader),
        "KSampler" | "KSamplerAdvanced" => serde_json::from_value(raw.inputs)
            .map_or(WorkflowNode::Unrecognized, WorkflowNode::Sampler),
        "CLIPTextEncode" => serde_json::from_value(raw.inputs)
            .map_or(WorkflowNode::Unrecognized, WorkflowNode::TextEncode),
        _ => WorkflowNode::Unrecognized,
    };
    Some(node)
}

/// Stringify a scalar input value. Node links (arrays) and objects yield
/// `None`: a linked input has no literal value to record.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_f32(value: &Value) -> Option<f32> {
    value.as_f64().map(|f| f as f32)
}
