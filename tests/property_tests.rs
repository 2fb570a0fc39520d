use bytes::Bytes;
use http::Request;
use proptest::prelude::*;
use webecho::common::{send_raw_request, spawn_test_server};
use webecho::http::format_echo_body;

fn header_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn header_value() -> impl Strategy<Value = String> {
    "[ -~&&[^\"]]{0,24}".prop_map(|v| v.trim().to_string())
}

fn path() -> impl Strategy<Value = String> {
    "/[a-z0-9/_.-]{0,32}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: without headers the body is just the URL line and the header banner
    #[test]
    fn body_without_headers_is_url_and_banner(path in path()) {
        let req = Request::builder().uri(path.as_str()).body(Bytes::new()).unwrap();

        prop_assert_eq!(format_echo_body(&req), format!("URL: {path}\nHeader:\n"));
    }

    /// Property: header lines come out sorted by name, whatever order they went in
    #[test]
    fn header_lines_are_sorted_by_name(
        headers in prop::collection::vec((header_name(), header_value()), 1..12)
    ) {
        let mut builder = Request::builder().uri("/");
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let req = builder.body(Bytes::new()).unwrap();

        let body = format_echo_body(&req);
        let names: Vec<&str> = body
            .lines()
            .skip(2)
            .map(|line| line.split(" -> ").next().unwrap_or_default())
            .collect();

        let mut expected: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();
        expected.sort_unstable();
        expected.dedup();

        prop_assert_eq!(names, expected);
    }

    /// Property: values for one name keep their insertion order, each quoted
    #[test]
    fn values_keep_insertion_order(values in prop::collection::vec(header_value(), 1..6)) {
        let mut builder = Request::builder().uri("/");
        for value in &values {
            builder = builder.header("key", value.as_str());
        }
        let req = builder.body(Bytes::new()).unwrap();

        let expected = values
            .iter()
            .map(|v| format!("\"{v}\""))
            .collect::<Vec<_>>()
            .join("; ");

        let body = format_echo_body(&req);
        let expected_line = format!("key -> {expected}");
        prop_assert_eq!(body.lines().last(), Some(expected_line.as_str()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    /// Property: whatever path is requested over the wire, the echo body reports it
    #[test]
    fn served_echo_reports_requested_path(path in path()) {
        tokio_test::block_on(async {
            let (server_handle, addr, _shutdown) = spawn_test_server("prop").await
                .map_err(|e| TestCaseError::fail(format!("Server setup failed: {}", e)))?;

            let request = format!("GET {path} HTTP/1.1\r\nConnection: close\r\n\r\n");
            let response = send_raw_request(addr, &request).await
                .map_err(|e| TestCaseError::fail(format!("Request failed: {}", e)))?;

            server_handle.abort();

            prop_assert_eq!(response.status, 200);
            prop_assert_eq!(
                response.body,
                format!("URL: {path}\nHeader:\nconnection -> \"close\"\n")
            );
            Ok(())
        })?;
    }
}
