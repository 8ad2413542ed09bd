//! Shared helpers for integration tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Start a server on an ephemeral port that answers exactly one HTTP request
/// with `status` and `body`, then returns the request it saw (head + body).
pub fn one_shot_server(
    status: &'static str,
    content_type: &'static str,
    body: String,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream);

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read header line") == 0 {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("content-length");
                }
            }
            let done = line == "\r\n";
            head.push_str(&line);
            if done {
                break;
            }
        }

        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).expect("read body");

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush");

        head + &String::from_utf8_lossy(&request_body)
    });

    (base, handle)
}
