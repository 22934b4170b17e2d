//! 简历文本提取

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// 读取简历文本：PDF使用pdf-extract提取，其余按UTF-8文本读取
pub fn extract_cv_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path)
            .with_context(|| format!("Failed to extract text from PDF {:?}", path))?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CV file {:?}", path))?
    };

    debug!(chars = text.len(), "extracted CV text from {:?}", path);
    Ok(text)
}
