//! Unit tests for news module

#[cfg(test)]
mod tests {
    use super::super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="g">
            <a href="/url?q=https://news.example.com/acme-record&amp;sa=U&amp;ved=abc">
              <h3>Acme posts <b>record</b> quarter</h3>
            </a>
          </div>
          <div class="g">
            <a href="https://wire.example.com/acme-lawsuit"><h3>Acme faces lawsuit</h3></a>
          </div>
          <div class="g"><span>sponsored, no headline</span></div>
          <div class="g">
            <a href="https://wire.example.com/acme-ceo"><h3>Acme names new CEO</h3></a>
          </div>
        </body></html>
    "#;

    /// Serves one canned HTTP response and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "{}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request);
        });

        (format!("http://{}/search", addr), rx)
    }

    fn fetcher_for(search_url: String) -> NewsFetcher {
        NewsFetcher::new(&NewsConfig {
            search_url,
            ..NewsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_query_format() {
        assert_eq!(search_query("Acme Corp"), "Acme Corp stock news");
    }

    #[test]
    fn test_parse_extracts_titles_and_links() {
        let articles = parse_search_results(RESULTS_PAGE, 10).unwrap();

        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "Acme posts record quarter");
        assert_eq!(articles[0].url, "https://news.example.com/acme-record");
        assert_eq!(articles[1].url, "https://wire.example.com/acme-lawsuit");
    }

    #[test]
    fn test_limit_counts_containers() {
        // The third container has no headline but still uses up a slot
        let articles = parse_search_results(RESULTS_PAGE, 3).unwrap();
        assert_eq!(articles.len(), 2);

        let articles = parse_search_results(RESULTS_PAGE, 1).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Acme posts record quarter");
    }

    #[test]
    fn test_page_without_results() {
        let articles = parse_search_results("<html><body><p>captcha</p></body></html>", 10).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_empty_search_url_rejected_before_client_setup() {
        // An unusable User-Agent would fail client construction; the URL check comes first
        let result = NewsFetcher::new(&NewsConfig {
            search_url: String::new(),
            user_agent: "bad\nagent".to_string(),
            ..NewsConfig::default()
        });
        assert!(matches!(result, Err(StockyError::Config(_))));
    }

    #[test]
    fn test_empty_search_url_rejected() {
        let result = NewsFetcher::new(&NewsConfig {
            search_url: String::new(),
            ..NewsConfig::default()
        });
        assert!(matches!(result, Err(StockyError::Config(_))));
    }

    #[tokio::test]
    async fn test_zero_names_returns_empty() {
        let fetcher = fetcher_for("http://127.0.0.1:1/search".to_string());
        let news = fetcher.find_top_news(&[], 10).await;
        assert!(news.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_user_agent() {
        let (url, request) = serve_once("HTTP/1.1 200 OK", RESULTS_PAGE).await;
        let fetcher = fetcher_for(url);

        let news = fetcher.find_top_news(&["Acme".to_string()], 10).await;
        assert_eq!(news["Acme"].len(), 3);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /search?q=Acme+stock+news&tbm=nws"));
        assert!(request.to_lowercase().contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_non_200_leaves_entry_empty() {
        let (url, _request) = serve_once("HTTP/1.1 429 Too Many Requests", "slow down").await;
        let fetcher = fetcher_for(url);

        let news = fetcher.find_top_news(&["Acme".to_string()], 10).await;
        assert!(news.contains_key("Acme"));
        assert!(news["Acme"].is_empty());
    }

    #[tokio::test]
    async fn test_non_200_reported_as_http_error() {
        let (url, _request) = serve_once("HTTP/1.1 429 Too Many Requests", "slow down").await;
        let fetcher = fetcher_for(url);

        let err = fetcher.fetch_stock_news("Acme", 10).await.unwrap_err();
        assert!(matches!(err, StockyError::Http { status: 429 }));
    }

    #[tokio::test]
    async fn test_success_after_refusal_still_collected() {
        let (refused, _r1) = serve_once("HTTP/1.1 503 Service Unavailable", "").await;
        let (ok, _r2) = serve_once("HTTP/1.1 200 OK", RESULTS_PAGE).await;

        let refused = fetcher_for(refused).fetch_stock_news("Acme", 10).await;
        assert!(matches!(refused, Err(StockyError::Http { status: 503 })));
        let articles = fetcher_for(ok).fetch_stock_news("Acme", 10).await.unwrap();
        assert_eq!(articles.len(), 3);
    }

    #[tokio::test]
    async fn test_network_failure_is_not_fatal() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = fetcher_for(format!("http://{}/search", addr));
        let names = vec!["Acme".to_string(), "Globex".to_string()];
        let news = fetcher.find_top_news(&names, 10).await;

        assert_eq!(news.len(), 2);
        assert!(news.values().all(|articles| articles.is_empty()));
    }
}
