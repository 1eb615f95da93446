//! 展示层格式化：显示名、头像缩写、相对时间、头像渐变色

use chrono::{DateTime, Datelike, Utc};

/// 全名与用户名都缺失时的显示名
pub const DEFAULT_DISPLAY_NAME: &str = "Usuario";

/// 头像渐变色（CSS 颜色值）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarGradient {
    pub from: &'static str,
    pub to: &'static str,
}

pub const AVATAR_PALETTE: [AvatarGradient; 8] = [
    AvatarGradient { from: "#667eea", to: "#764ba2" },
    AvatarGradient { from: "#f093fb", to: "#f5576c" },
    AvatarGradient { from: "#4facfe", to: "#00f2fe" },
    AvatarGradient { from: "#43e97b", to: "#38f9d7" },
    AvatarGradient { from: "#fa709a", to: "#fee140" },
    AvatarGradient { from: "#30cfd0", to: "#330867" },
    AvatarGradient { from: "#a8edea", to: "#fed6e3" },
    AvatarGradient { from: "#ff9a9e", to: "#fecfef" },
];

/// 显示名回退顺序：全名 → 用户名 → "Usuario"
pub fn display_name(full_name: Option<&str>, username: Option<&str>) -> String {
    [full_name, username]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string()
}

/// 头像缩写：取前两个单词的首字母；只有一个单词时取前两个字符
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let chars: Vec<char> = match words.as_slice() {
        [] => return DEFAULT_DISPLAY_NAME[..1].to_string(),
        [single] => single.chars().take(2).collect(),
        [first, second, ..] => first
            .chars()
            .next()
            .into_iter()
            .chain(second.chars().next())
            .collect(),
    };
    chars.into_iter().flat_map(char::to_uppercase).collect()
}

/// 相对时间（按整数截断）
///
/// 不足 1 分钟 "Ahora"，不足 1 小时 "Hace N min"，不足 1 天 "Hace N h"，
/// 不足 7 天 "Hace N d"，更早则显示日期 `d/m/aaaa`。未来时间按 "Ahora" 处理。
pub fn format_relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if elapsed.num_seconds() < 60 {
        "Ahora".to_string()
    } else if minutes < 60 {
        format!("Hace {} min", minutes)
    } else if hours < 24 {
        format!("Hace {} h", hours)
    } else if days < 7 {
        format!("Hace {} d", days)
    } else {
        format!(
            "{}/{}/{}",
            created_at.day(),
            created_at.month(),
            created_at.year()
        )
    }
}

/// 同一作者在整个会话内始终得到同一渐变色
pub fn avatar_gradient(author_id: i64) -> AvatarGradient {
    let index = author_id.rem_euclid(AVATAR_PALETTE.len() as i64) as usize;
    AVATAR_PALETTE[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(display_name(Some("Ana Ruiz"), Some("ana")), "Ana Ruiz");
        assert_eq!(display_name(Some("  "), Some("ana")), "ana");
        assert_eq!(display_name(None, None), "Usuario");
    }

    #[test]
    fn initials_from_names() {
        assert_eq!(initials("Juan Carlos Pérez"), "JC");
        assert_eq!(initials("Madonna"), "MA");
        assert_eq!(initials("ñandú"), "ÑA");
        assert_eq!(initials("x"), "X");
        assert_eq!(initials("   "), "U");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "Ahora");
        assert_eq!(format_relative_time(now + Duration::seconds(30), now), "Ahora");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "Hace 5 min");
        assert_eq!(format_relative_time(now - Duration::minutes(90), now), "Hace 1 h");
        assert_eq!(format_relative_time(now - Duration::hours(30), now), "Hace 1 d");
        assert_eq!(format_relative_time(now - Duration::days(10), now), "8/10/2026");
    }

    #[test]
    fn gradient_is_stable_per_author() {
        assert_eq!(avatar_gradient(3), avatar_gradient(3 + AVATAR_PALETTE.len() as i64));
        assert_eq!(avatar_gradient(-1), AVATAR_PALETTE[AVATAR_PALETTE.len() - 1]);
    }
}
