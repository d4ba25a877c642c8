/// 学科枚举
///
/// 历史与公民合卷中的两个学科，声明顺序即学科比例中的"先列学科"顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// 历史
    History,
    /// 公民
    Civics,
}

impl Discipline {
    /// 按比例拆分时的固定顺序
    pub const ORDER: [Discipline; 2] = [Discipline::History, Discipline::Civics];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Discipline::History => "history",
            Discipline::Civics => "civics",
        }
    }
}

impl std::str::FromStr for Discipline {
    type Err = String;

    /// 从字符串解析学科（忽略大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "history" | "hist" => Ok(Discipline::History),
            "civics" | "civ" => Ok(Discipline::Civics),
            _ => Err(format!("未知学科: {}", s)),
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("History".parse::<Discipline>(), Ok(Discipline::History));
        assert_eq!(" civics ".parse::<Discipline>(), Ok(Discipline::Civics));
        assert!("geography".parse::<Discipline>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let d: Discipline = serde_json::from_str("\"civics\"").unwrap();
        assert_eq!(d, Discipline::Civics);
        assert_eq!(serde_json::to_string(&Discipline::History).unwrap(), "\"history\"");
    }
}
