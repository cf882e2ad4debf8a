//! Reflection 短期记忆：执行与反思的轨迹
//!
//! 仅在单次 Reflection 运行内有效，只追加不修改；运行结束随 ReflectionOutcome 交给调用方，不做持久化。

/// 记录类型：一次执行（生成/优化的结果）或一次反思（评审反馈）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Execution,
    Reflection,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Execution => "execution",
            RecordKind::Reflection => "reflection",
        }
    }

    /// 轨迹中的段落标题
    fn section_label(&self) -> &'static str {
        match self {
            RecordKind::Execution => "--- 上一轮尝试 (代码) ---",
            RecordKind::Reflection => "--- 评审员反馈 ---",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryRecord {
    pub kind: RecordKind,
    pub content: String,
}

/// 按插入顺序保存的记录序列
#[derive(Clone, Debug, Default)]
pub struct Memory {
    records: Vec<MemoryRecord>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, kind: RecordKind, content: impl Into<String>) {
        self.records.push(MemoryRecord {
            kind,
            content: content.into(),
        });
        tracing::debug!(
            "Memory updated with a '{}' record ({} total)",
            kind.as_str(),
            self.records.len()
        );
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    /// 将全部记录格式化为一段连贯文本，可用于需要完整上下文的提示词
    pub fn trajectory(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{}\n{}", r.kind.section_label(), r.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 最近一次执行结果：逆序扫描，返回第一条 Execution 记录
    pub fn last_execution(&self) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|r| r.kind == RecordKind::Execution)
            .map(|r| r.content.as_str())
    }

    /// 已完成的反思轮数
    pub fn reflection_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.kind == RecordKind::Reflection)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_execution_empty() {
        let memory = Memory::new();
        assert!(memory.is_empty());
        assert_eq!(memory.last_execution(), None);
    }

    #[test]
    fn test_last_execution_skips_reflections() {
        let mut memory = Memory::new();
        memory.add_record(RecordKind::Execution, "v1");
        memory.add_record(RecordKind::Reflection, "too slow");
        assert_eq!(memory.last_execution(), Some("v1"));

        memory.add_record(RecordKind::Execution, "v2");
        memory.add_record(RecordKind::Reflection, "still slow");
        memory.add_record(RecordKind::Reflection, "really");
        assert_eq!(memory.last_execution(), Some("v2"));
        assert_eq!(memory.reflection_count(), 3);
        assert_eq!(memory.len(), 5);
    }

    #[test]
    fn test_only_reflections_has_no_execution() {
        let mut memory = Memory::new();
        memory.add_record(RecordKind::Reflection, "orphan");
        assert_eq!(memory.last_execution(), None);
    }

    #[test]
    fn test_trajectory_format() {
        let mut memory = Memory::new();
        memory.add_record(RecordKind::Execution, "def f(): pass");
        memory.add_record(RecordKind::Reflection, "无需改进");

        assert_eq!(
            memory.trajectory(),
            "--- 上一轮尝试 (代码) ---\ndef f(): pass\n\n--- 评审员反馈 ---\n无需改进"
        );
        assert_eq!(Memory::new().trajectory(), "");
    }
}
