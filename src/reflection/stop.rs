//! 停止信号：评审反馈中出现「无需改进」即结束优化循环
//!
//! 两个标记分别判断：中文标记按原文逐字节匹配，英文标记先把反馈转小写再匹配。

pub const STOP_MARKER_ZH: &str = "无需改进";
pub const STOP_MARKER_EN: &str = "no need for improvement";

pub fn is_stop_signal(feedback: &str) -> bool {
    feedback.contains(STOP_MARKER_ZH) || feedback.to_lowercase().contains(STOP_MARKER_EN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_marker() {
        assert!(is_stop_signal("代码已是最优，无需改进。"));
        assert!(!is_stop_signal("需要改进：使用筛法"));
    }

    #[test]
    fn test_english_marker_is_case_insensitive() {
        assert!(is_stop_signal("There is no need for improvement."));
        assert!(is_stop_signal("NO NEED FOR IMPROVEMENT"));
        assert!(!is_stop_signal("No need to improve"));
        assert!(!is_stop_signal("there is need for improvement"));
    }
}
