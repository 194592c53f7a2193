//! Help requests short-circuit the pipeline before any parsing happens.

/// Usage text returned for `help`, `へるぷ` and `ヘルプ`.
pub const HELP_TEXT: &str = "特定のフォーマットで発言することで、家計簿を更新できます。
例)
2023/01/01
食材費 4000
日用品 1500

1行目に更新対象日を指定できます。
省略した場合は発言した日が対象日になります。
上の例では、2023/01/01の食材費に4000円、日用品に1500円を加算します。
数値部分にはマイナス値を入れることも可能です。

使用できる項目は以下の通り。
- 食材費
- 外食費
- 日用品
- 家賃
- 水道代
- 電気代
- ガス代
- 通信費
- 貯金
";

const KANA_SPELLINGS: [&str; 2] = ["へるぷ", "ヘルプ"];

/// True when the whole message asks for help.
pub fn is_help_request(message: &str) -> bool {
    let message = message.trim();
    message.eq_ignore_ascii_case("help") || KANA_SPELLINGS.contains(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_every_spelling() {
        for input in ["help", "HELP", "Help", "へるぷ", "ヘルプ", " help\n"] {
            assert!(is_help_request(input), "{input:?} should ask for help");
        }
    }

    #[test]
    fn ignores_help_inside_longer_messages() {
        assert!(!is_help_request("help me"));
        assert!(!is_help_request("食材費 100\nhelp"));
        assert!(!is_help_request("ヘルプ!"));
        assert!(!is_help_request(""));
    }

    #[test]
    fn help_text_lists_every_category() {
        for category in kakeibo_domain::Category::ALL {
            assert!(HELP_TEXT.contains(category.label()));
        }
    }
}
