//! 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    DeepSeek,
    OpenAi,
    Mock,
}

/// 后端选择规则：
/// - provider = mock 时总是 Mock
/// - 有 DeepSeek Key，或配置为 deepseek 且仅有 OpenAI Key（走 DeepSeek 兼容端点）→ DeepSeek
/// - 有 OpenAI Key 且 provider 不是 deepseek → OpenAI
/// - 其余情况（无任何 Key）退回 Mock
pub fn select_backend(provider: &str, has_deepseek_key: bool, has_openai_key: bool) -> Backend {
    let provider = provider.to_lowercase();
    if provider == "mock" {
        return Backend::Mock;
    }
    if has_deepseek_key || (provider == "deepseek" && has_openai_key) {
        Backend::DeepSeek
    } else if has_openai_key && provider != "deepseek" {
        Backend::OpenAi
    } else {
        Backend::Mock
    }
}

/// 按 [`select_backend`] 的结果构建客户端
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let openai_key = std::env::var("OPENAI_API_KEY").ok();
    let backend = select_backend(
        &cfg.llm.provider,
        std::env::var("DEEPSEEK_API_KEY").is_ok(),
        openai_key.is_some(),
    );

    match backend {
        Backend::DeepSeek => {
            let model = cfg
                .llm
                .deepseek
                .model
                .clone()
                .unwrap_or_else(|| cfg.llm.model.clone());
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(create_deepseek_client(Some(&model)))
        }
        Backend::OpenAi => {
            let model = cfg
                .llm
                .openai
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string());
            tracing::info!("Using OpenAI LLM ({})", model);
            Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &model,
                openai_key.as_deref(),
            ))
        }
        Backend::Mock => {
            tracing::warn!("No API key set or provider is mock, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_backend() {
        assert_eq!(select_backend("mock", true, true), Backend::Mock);
        assert_eq!(select_backend("deepseek", true, false), Backend::DeepSeek);
        assert_eq!(select_backend("DeepSeek", false, true), Backend::DeepSeek);
        assert_eq!(select_backend("openai", false, true), Backend::OpenAi);
        assert_eq!(select_backend("openai", true, true), Backend::DeepSeek);
        assert_eq!(select_backend("openai", false, false), Backend::Mock);
        assert_eq!(select_backend("deepseek", false, false), Backend::Mock);
    }

    #[test]
    fn test_mock_provider_builds_mock() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".to_string();
        let llm = create_llm_from_config(&cfg);
        assert_eq!(llm.token_usage(), (0, 0, 0));
    }
}
