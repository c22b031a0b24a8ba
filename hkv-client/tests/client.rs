use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use hkv_client::{ClientConfig, KVClient};

fn spawn_server(expected_commands: usize, handler: fn(usize, Vec<Vec<u8>>, &mut TcpStream)) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        for idx in 0..expected_commands {
            let args = read_command(&mut reader).expect("read command");
            handler(idx, args, &mut stream);
        }
    });

    addr
}

/// Reads one request: a whitespace-split header line, plus a payload when
/// the command is `SET`/`HSET` (the last header token is its length).
fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let mut line = Vec::new();
    read_line(reader, &mut line)?;
    let text = String::from_utf8(line).expect("utf8 header");
    let mut tokens: Vec<Vec<u8>> = text.split(' ').map(|t| t.as_bytes().to_vec()).collect();

    let command = String::from_utf8(tokens[0].clone()).unwrap().to_uppercase();
    if command == "SET" || command == "HSET" {
        let len: usize = String::from_utf8(tokens.last().unwrap().clone())
            .unwrap()
            .parse()
            .expect("numeric length");
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload)?;
        tokens.push(payload);
    }

    Ok(tokens)
}

fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn write_status(stream: &mut TcpStream, token: &str) {
    let _ = stream.write_all(token.as_bytes());
    let _ = stream.write_all(b"\r\n");
    let _ = stream.flush();
}

fn write_values(stream: &mut TcpStream, values: &[&[u8]]) {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"VALUES\r\n");
    buf.extend_from_slice(values.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for value in values {
        buf.extend_from_slice(value.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(value);
    }
    let _ = stream.write_all(&buf);
    let _ = stream.flush();
}

fn client_with_addr(addr: String) -> KVClient {
    let config = ClientConfig {
        addr,
        max_idle: 1,
        max_total: 1,
        read_timeout: Some(Duration::from_secs(1)),
        write_timeout: Some(Duration::from_secs(1)),
        connect_timeout: Some(Duration::from_secs(1)),
    };
    KVClient::with_config(config).expect("client")
}

#[test]
fn client_set_get_roundtrip() {
    let addr = spawn_server(2, |idx, args, stream| {
        if idx == 0 {
            assert_eq!(args[0], b"SET");
            assert_eq!(args[1], b"key");
            assert_eq!(args[2], b"0");
            assert_eq!(args[4], b"value");
            write_status(stream, "OK");
        } else {
            assert_eq!(args[0], b"GET");
            assert_eq!(args[1], b"key");
            write_values(stream, &[b"value"]);
        }
    });

    let client = client_with_addr(addr);
    client.set(b"key", b"value").expect("set");
    let value = client.get(b"key").expect("get");
    assert_eq!(value, Some(b"value".to_vec()));
}

#[test]
fn client_get_missing_key_is_none() {
    let addr = spawn_server(1, |_idx, args, stream| {
        assert_eq!(args[0], b"GET");
        write_status(stream, "NOT_FOUND");
    });

    let client = client_with_addr(addr);
    let value = client.get(b"missing").expect("get");
    assert_eq!(value, None);
}

#[test]
fn client_expire_and_delete() {
    let addr = spawn_server(2, |idx, args, stream| {
        if idx == 0 {
            assert_eq!(args[0], b"EXPIRE");
            assert_eq!(args[1], b"key");
            assert_eq!(args[2], b"5");
            write_status(stream, "OK");
        } else {
            assert_eq!(args[0], b"DELETE");
            assert_eq!(args[1], b"key");
            write_status(stream, "OK");
        }
    });

    let client = client_with_addr(addr);
    let set = client.expire(b"key", 5).expect("expire");
    assert!(set);
    client.delete(b"key").expect("delete");
}

#[test]
fn client_hset_hgetall_roundtrip() {
    let addr = spawn_server(2, |idx, args, stream| {
        if idx == 0 {
            assert_eq!(args[0], b"HSET");
            assert_eq!(args[1], b"h");
            assert_eq!(args[2], b"f1");
            write_status(stream, "OK");
        } else {
            assert_eq!(args[0], b"HGETALL");
            write_values(stream, &[b"f1", b"v1"]);
        }
    });

    let client = client_with_addr(addr);
    client.hset(b"h", b"f1", b"v1").expect("hset");
    let pairs = client.hgetall(b"h").expect("hgetall").expect("present");
    assert_eq!(pairs, vec![(b"f1".to_vec(), b"v1".to_vec())]);
}

#[test]
fn default_config_enforces_a_one_second_read_deadline() {
    // A server that accepts the connection and reads the request but never
    // replies: with no deadline this call would hang forever.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let _ = read_command(&mut reader);
        thread::sleep(Duration::from_secs(5));
    });

    let config = ClientConfig {
        addr,
        ..ClientConfig::default()
    };
    let client = KVClient::with_config(config).expect("client");

    let started = Instant::now();
    let err = client.get(b"key").expect_err("expected a timeout");
    let elapsed = started.elapsed();

    assert!(matches!(err, hkv_client::ClientError::Io(_)));
    assert!(elapsed < Duration::from_secs(3), "deadline did not fire promptly: {elapsed:?}");
}

#[test]
fn client_reports_server_errors() {
    let addr = spawn_server(1, |_idx, args, stream| {
        assert_eq!(args[0], b"HGET");
        write_status(stream, "BAD_FORMAT");
    });

    let client = client_with_addr(addr);
    let err = client.hget(b"h", b"f1").expect_err("expected error");
    match err {
        hkv_client::ClientError::Server { token } => assert_eq!(token, "BAD_FORMAT"),
        other => panic!("unexpected error: {other}"),
    }
}
