//! 提示词模板：名称 -> 模板字符串，`{placeholder}` 单遍替换
//!
//! 内置五个中文模板；`PromptTemplates::load(dir)` 会用 `<dir>/<name>.txt` 覆盖同名模板。
//! 模板名与占位符集合是对外契约，措辞不是。

use std::collections::HashMap;
use std::path::Path;

use crate::core::AgentError;

pub const PLANNER: &str = "planner";
pub const EXECUTOR: &str = "executor";
pub const INITIAL: &str = "initial";
pub const REFLECT: &str = "reflect";
pub const REFINE: &str = "refine";

/// 每个模板必须包含的占位符
pub const REQUIRED_PLACEHOLDERS: &[(&str, &[&str])] = &[
    (PLANNER, &["question"]),
    (EXECUTOR, &["question", "plan", "history", "current_step"]),
    (INITIAL, &["task"]),
    (REFLECT, &["task", "code"]),
    (REFINE, &["task", "last_code_attempt", "feedback"]),
];

const PLANNER_TEMPLATE: &str = r#"你是一个顶级的AI规划专家。你的任务是将用户提出的复杂问题分解成一个由多个简单步骤组成的行动计划。
请确保计划中的每个步骤都是一个独立的、可执行的子任务，并且严格按照逻辑顺序排列。
你的输出必须是一个Python列表，其中每个元素都是一个描述子任务的字符串。

问题: {question}

请严格按照以下格式输出你的计划，```python与```作为前后缀是必要的:
```python
["步骤1", "步骤2", "步骤3"]
```
"#;

const EXECUTOR_TEMPLATE: &str = r#"你是一位顶级的AI执行专家。你的任务是严格按照给定的计划，一步步地解决问题。
你将收到原始问题、完整的计划、以及到目前为止已经完成的步骤和结果。
请你专注于解决"当前步骤"，并仅输出该步骤的最终答案，不要输出任何额外的解释或对话。

# 原始问题:
{question}

# 完整计划:
{plan}

# 历史步骤与结果:
{history}

# 当前步骤:
{current_step}

请仅输出针对"当前步骤"的回答:
"#;

const INITIAL_TEMPLATE: &str = r#"你是一位资深的Python程序员。请根据以下要求，编写一个Python函数。
你的代码必须包含完整的函数签名、文档字符串，并遵循PEP 8编码规范。

要求: {task}

请直接输出代码，不要包含任何额外的解释。
"#;

const REFLECT_TEMPLATE: &str = r#"你是一位极其严格的代码评审专家和资深算法工程师，对代码的性能有极致的要求。
你的任务是审查以下Python代码，并专注于找出其在算法效率上的主要瓶颈。

# 原始任务:
{task}

# 待审查的代码:
```python
{code}
```

请分析该代码的时间复杂度，并思考是否存在一种算法上更优的解决方案来显著提升性能。
如果存在，请清晰地指出当前算法的不足，并提出具体的、可行的改进算法建议。
如果代码在算法层面已经达到最优，才能回答"无需改进"。

请直接输出你的反馈，不要包含任何额外的解释。
"#;

const REFINE_TEMPLATE: &str = r#"你是一位资深的Python程序员。你正在根据一位代码评审专家的反馈来优化你的代码。

# 原始任务:
{task}

# 你上一轮尝试的代码:
{last_code_attempt}

# 评审员的反馈:
{feedback}

请根据评审员的反馈，生成一个优化后的新版本代码。
你的代码必须包含完整的函数签名、文档字符串，并遵循PEP 8编码规范。
请直接输出优化后的代码，不要包含任何额外的解释。
"#;

/// 单遍替换 `{name}` 占位符：未在 fields 中出现的 `{...}` 原样保留，
/// 已代入的值不会被再次扫描（历史记录里出现 `{feedback}` 之类的文本也不会被误替换）。
/// 与 Python `str.format` 一致，`{{` / `}}` 转义为字面的 `{` / `}`。
pub fn render(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let after = &tail[1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            fields
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// 注入式模板表（替代进程级全局常量），测试中可以随意替换
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<String, String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTemplates {
    /// 内置中文模板
    pub fn builtin() -> Self {
        let templates = [
            (PLANNER, PLANNER_TEMPLATE),
            (EXECUTOR, EXECUTOR_TEMPLATE),
            (INITIAL, INITIAL_TEMPLATE),
            (REFLECT, REFLECT_TEMPLATE),
            (REFINE, REFINE_TEMPLATE),
        ]
        .into_iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();
        Self { templates }
    }

    /// 内置模板 + `<dir>/<name>.txt` 覆盖；加载后检查占位符，缺失时仅告警
    pub fn load(dir: Option<&Path>) -> Self {
        let mut prompts = Self::builtin();
        if let Some(dir) = dir {
            for (name, _) in REQUIRED_PLACEHOLDERS {
                let path = dir.join(format!("{}.txt", name));
                match std::fs::read_to_string(&path) {
                    Ok(text) => {
                        tracing::info!("Loaded prompt template '{}' from {:?}", name, path);
                        prompts.templates.insert(name.to_string(), text);
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!("Failed to read prompt {:?}, using built-in: {}", path, e)
                    }
                }
            }
        }

        for (name, placeholder) in prompts.missing_placeholders() {
            tracing::warn!(
                "Prompt template '{}' is missing placeholder {{{}}}",
                name,
                placeholder
            );
        }
        prompts
    }

    pub fn with_template(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(name.into(), template.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn render(&self, name: &str, fields: &[(&str, &str)]) -> Result<String, AgentError> {
        let template = self
            .get(name)
            .ok_or_else(|| AgentError::Template(name.to_string()))?;
        Ok(render(template, fields))
    }

    /// (模板名, 占位符)：必需占位符未出现在模板中的组合；模板本身缺失时也会列出
    pub fn missing_placeholders(&self) -> Vec<(&'static str, &'static str)> {
        REQUIRED_PLACEHOLDERS
            .iter()
            .flat_map(|(name, placeholders)| {
                let template = self.get(name).unwrap_or_default();
                placeholders
                    .iter()
                    .filter(move |p| {
                        !render(template, &[(**p, "\u{0}")]).contains('\u{0}')
                    })
                    .map(move |p| (*name, *p))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_substitutes_known_fields() {
        let out = render("Q: {question} / {unknown}", &[("question", "1+1?")]);
        assert_eq!(out, "Q: 1+1? / {unknown}");
    }

    #[test]
    fn test_render_is_single_pass() {
        let out = render(
            "{history} then {feedback}",
            &[("history", "said {feedback}"), ("feedback", "ok")],
        );
        assert_eq!(out, "said {feedback} then ok");
    }

    #[test]
    fn test_render_handles_stray_braces() {
        assert_eq!(render("a { b } {x", &[("x", "y")]), "a { b } {x");
        assert_eq!(render("if x: }", &[("x", "y")]), "if x: }");
    }

    #[test]
    fn test_render_unescapes_doubled_braces() {
        assert_eq!(render("{{x}}", &[("x", "y")]), "{x}");
        assert_eq!(render("{{x}} = {x}", &[("x", "y")]), "{x} = y");
        assert_eq!(render("d = {{'k': {x}}}", &[("x", "1")]), "d = {'k': 1}");
    }

    #[test]
    fn test_escaped_placeholder_counts_as_missing() {
        let prompts = PromptTemplates::builtin().with_template(INITIAL, "{{task}}");
        assert_eq!(prompts.missing_placeholders(), vec![(INITIAL, "task")]);
    }

    #[test]
    fn test_builtin_templates_are_complete() {
        let prompts = PromptTemplates::builtin();
        assert!(prompts.missing_placeholders().is_empty());
        let planner = prompts.render(PLANNER, &[("question", "今天周几")]).unwrap();
        assert!(planner.contains("问题: 今天周几"));
        assert!(planner.contains("```python"));
    }

    #[test]
    fn test_unknown_template_is_error() {
        let err = PromptTemplates::builtin().render("nope", &[]).unwrap_err();
        assert!(matches!(err, AgentError::Template(name) if name == "nope"));
    }

    #[test]
    fn test_missing_placeholders_reported() {
        let prompts = PromptTemplates::builtin().with_template(REFINE, "only {task}");
        assert_eq!(
            prompts.missing_placeholders(),
            vec![(REFINE, "last_code_attempt"), (REFINE, "feedback")]
        );
    }

    #[test]
    fn test_load_overrides_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("initial.txt"), "写代码: {task}").unwrap();

        let prompts = PromptTemplates::load(Some(dir.path()));
        assert_eq!(prompts.get(INITIAL), Some("写代码: {task}"));
        assert_eq!(prompts.get(PLANNER), Some(PLANNER_TEMPLATE));
    }
}
