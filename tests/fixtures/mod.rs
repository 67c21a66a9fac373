//! Test fixtures: synthesized PNG files with embedded workflow metadata

use std::fs;
use std::io;
use std::path::Path;

/// PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Append one chunk with a zeroed CRC (the extractor skips CRC bytes).
fn push_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&[0u8; 4]);
}

/// Minimal PNG container: signature, bare IHDR, optional tEXt, IEND.
/// Sufficient for metadata extraction, which never decodes pixels.
fn png_bytes(text_chunks: &[(&str, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    push_chunk(&mut out, b"IHDR", &[0u8; 13]);
    for (keyword, value) in text_chunks {
        let mut data = Vec::with_capacity(keyword.len() + 1 + value.len());
        data.extend_from_slice(keyword.as_bytes());
        data.push(0);
        data.extend_from_slice(value.as_bytes());
        push_chunk(&mut out, b"tEXt", &data);
    }
    push_chunk(&mut out, b"IEND", &[]);
    out
}

/// Write a PNG whose `prompt` chunk holds the given workflow JSON.
pub fn write_workflow_png(path: &Path, workflow_json: &str) -> io::Result<()> {
    fs::write(path, png_bytes(&[("prompt", workflow_json)]))
}

/// Write a PNG with no text chunks at all.
pub fn write_plain_png(path: &Path) -> io::Result<()> {
    fs::write(path, png_bytes(&[]))
}

/// Write a PNG with a text chunk under an arbitrary keyword.
pub fn write_png_with_chunk(path: &Path, keyword: &str, value: &str) -> io::Result<()> {
    fs::write(path, png_bytes(&[(keyword, value)]))
}

/// Build a workflow graph JSON with one checkpoint loader and a LoRA
/// loader per entry, in the order given.
pub fn workflow_json(checkpoint: &str, loras: &[(&str, f32)]) -> String {
    let mut nodes = Vec::new();
    nodes.push(format!(
        r#""1": {{"class_type": "CheckpointLoaderSimple", "inputs": {{"ckpt_name": "{checkpoint}"}}}}"#
    ));
    for (i, (name, strength)) in loras.iter().enumerate() {
        nodes.push(format!(
            r#""{}": {{"class_type": "LoraLoaderModelOnly", "inputs": {{"lora_name": "{name}", "strength_model": {strength}}}}}"#,
            i + 10
        ));
    }
    format!("{{{}}}", nodes.join(", "))
}

/// Full-featured workflow graph: checkpoint, sampler, positive and
/// negative prompts.
pub fn rich_workflow_json(checkpoint: &str, positive: &str, negative: &str) -> String {
    format!(
        r#"{{
            "1": {{"class_type": "CheckpointLoaderSimple", "inputs": {{"ckpt_name": "{checkpoint}"}}}},
            "2": {{"class_type": "CLIPTextEncode", "inputs": {{"text": "{positive}"}}}},
            "3": {{"class_type": "CLIPTextEncode", "inputs": {{"text": "{negative}"}}}},
            "4": {{"class_type": "KSampler", "inputs": {{"steps": 30, "cfg": 7.0, "sampler_name": "euler", "scheduler": "normal", "seed": 42}}}}
        }}"#
    )
}

/// Write a real, decodable PNG filled with one color (for the color sorter).
pub fn write_color_png(path: &Path, rgb: [u8; 3]) -> io::Result<()> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb(rgb));
    img.save(path)
        .map_err(|err| io::Error::other(err.to_string()))
}
