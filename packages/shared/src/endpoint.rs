//! Endpoint path helpers.

/// Default endpoint path of the test socket.
pub const DEFAULT_ENDPOINT_PATH: &str = "/testSock";

/// Normalize an endpoint path to `/segment[/segment...]` form.
///
/// Adds a leading slash and strips trailing slashes. An empty path or `/`
/// normalizes to the empty string, i.e. the endpoint lives at the root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_adds_leading_slash() {
        // テスト項目: 先頭のスラッシュが補われる
        // given (前提条件):
        let path = "testSock";

        // when (操作):
        let normalized = normalize_path(path);

        // then (期待する結果):
        assert_eq!(normalized, "/testSock");
    }

    #[test]
    fn test_normalize_path_strips_trailing_slashes() {
        // テスト項目: 末尾のスラッシュが取り除かれる
        // given (前提条件):
        let path = "/ws/testSock//";

        // when (操作):
        let normalized = normalize_path(path);

        // then (期待する結果):
        assert_eq!(normalized, "/ws/testSock");
    }

    #[test]
    fn test_normalize_path_root_is_empty() {
        // テスト項目: ルートパスは空文字列に正規化される
        // given (前提条件):

        // when (操作):
        let root = normalize_path("/");
        let empty = normalize_path("");

        // then (期待する結果):
        assert_eq!(root, "");
        assert_eq!(empty, "");
    }
}
