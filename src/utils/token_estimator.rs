/// 截断后追加的提示
pub const TRUNCATION_NOTE: &str = "\n\n[Note: Text was truncated to fit token limits]";

/// 默认的token上限
pub const DEFAULT_TOKEN_LIMIT: usize = 8000;

/// Token估算器，按字符数粗略估算token数量
#[derive(Debug, Clone)]
pub struct TokenEstimator {
    /// 平均每个token对应的字符数
    chars_per_token: usize,
    /// 截断时保留的安全比例
    safety_ratio: f64,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self {
            chars_per_token: 4,
            safety_ratio: 0.9,
        }
    }

    /// 估算文本的token数量
    pub fn estimate_tokens(&self, text: &str) -> usize {
        text.chars().count() / self.chars_per_token
    }

    /// 检查文本是否超过token限制
    pub fn exceeds_limit(&self, text: &str, limit: usize) -> bool {
        self.estimate_tokens(text) > limit
    }

    /// 将文本截断到token上限之内，超限时追加截断说明
    pub fn truncate_to_limit(&self, text: &str, max_tokens: usize) -> String {
        if !self.exceeds_limit(text, max_tokens) {
            return text.to_string();
        }

        let chars_to_keep =
            (max_tokens as f64 * self.chars_per_token as f64 * self.safety_ratio) as usize;
        let truncated: String = text.chars().take(chars_to_keep).collect();
        format!("{}{}", truncated, TRUNCATION_NOTE)
    }
}

/// 使用默认估算器截断到 [`DEFAULT_TOKEN_LIMIT`]
pub fn truncate_to_token_limit(text: &str) -> String {
    TokenEstimator::new().truncate_to_limit(text, DEFAULT_TOKEN_LIMIT)
}
