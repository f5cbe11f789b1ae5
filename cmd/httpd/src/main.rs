//! # Static-file HTTP server over a workpool
//!
//! One task per accepted connection. The accept loop is the producer; a
//! fixed pool of workers reads each request and answers `GET` with the
//! contents of `index.html` (404 for anything else).
//!
//! The pool never sees connection errors: each task handles or logs its
//! own failures and closes its socket on return.
//!
//! ## Usage
//!
//!     cargo run -p workpool-httpd --release
//!
//!     WP_PORT=8080 WP_WORKERS=8 WP_INDEX=www/index.html cargo run -p workpool-httpd
//!
//! ## Environment Variables
//!
//! - `WP_PORT` - listen port (default 3490)
//! - `WP_WORKERS` - worker count (default 6)
//! - `WP_INDEX` - file served for GET requests (default index.html)

use workpool::{env_get, env_get_opt, kinfo, kwarn, PoolConfig, TaskPool};

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpStream};
use std::os::unix::io::FromRawFd;

const BACKLOG: i32 = 10; // how many pending connections queue will hold
const RECV_BUF_SIZE: usize = 4096;

// ── Listener setup ──

/// Create, configure, bind and listen. Returns the listening fd.
fn bind_socket(port: u16) -> Result<i32, i32> {
    let fd = unsafe {
        libc::socket(
            libc::AF_INET,
            libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
            0,
        )
    };
    if fd < 0 {
        return Err(unsafe { *libc::__errno_location() });
    }

    // SO_REUSEADDR so restarts don't trip over TIME_WAIT
    unsafe {
        let opt: i32 = 1;
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &opt as *const _ as *const _,
            4,
        );
    }

    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    addr.sin_family = libc::AF_INET as u16;
    addr.sin_addr.s_addr = 0; // INADDR_ANY
    addr.sin_port = port.to_be();

    let ret = unsafe {
        libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of_val(&addr) as u32,
        )
    };
    if ret != 0 {
        unsafe { libc::close(fd) };
        return Err(unsafe { *libc::__errno_location() });
    }

    if unsafe { libc::listen(fd, BACKLOG) } != 0 {
        unsafe { libc::close(fd) };
        return Err(unsafe { *libc::__errno_location() });
    }

    Ok(fd)
}

/// Accept one connection. Returns the client stream and peer address.
fn accept_client(listen_fd: i32) -> Result<(TcpStream, Ipv4Addr), i32> {
    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    let mut addr_len: libc::socklen_t = std::mem::size_of::<libc::sockaddr_in>() as u32;

    let client_fd = unsafe {
        libc::accept(
            listen_fd,
            &mut addr as *mut _ as *mut libc::sockaddr,
            &mut addr_len,
        )
    };
    if client_fd < 0 {
        return Err(unsafe { *libc::__errno_location() });
    }

    let peer = Ipv4Addr::from(u32::from_be(addr.sin_addr.s_addr));
    // Safety: client_fd is a freshly accepted, unowned socket fd
    let stream = unsafe { TcpStream::from_raw_fd(client_fd) };
    Ok((stream, peer))
}

// ── Per-connection task ──

/// Read the request and respond. Runs on a pool worker; the stream is
/// closed when it drops.
fn handle_connection(mut stream: TcpStream, index_path: &str) {
    let mut recv_buf = [0u8; RECV_BUF_SIZE];

    let numbytes = match stream.read(&mut recv_buf) {
        Ok(n) => n,
        Err(e) => {
            kwarn!("recv: {}", e);
            return;
        }
    };
    if numbytes == 0 {
        kinfo!("disconnected by client");
        return;
    }

    let response_result = if recv_buf[..numbytes].starts_with(b"GET") {
        match std::fs::read(index_path) {
            Ok(content) => {
                let headers = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
                    content.len()
                );
                stream
                    .write_all(headers.as_bytes())
                    .and_then(|_| stream.write_all(&content))
            }
            Err(e) => {
                kwarn!("failed to read `{}`: {}", index_path, e);
                stream.write_all(b"HTTP/1.1 404 NOT FOUND\r\nContent-Length: 0\r\n\r\n")
            }
        }
    } else {
        // Anything that is not a GET request
        stream.write_all(b"HTTP/1.1 404 NOT FOUND\r\nContent-Length: 0\r\n\r\n")
    };

    if let Err(e) = response_result {
        kwarn!("send: {}", e);
    }
}

fn main() {
    let port: u16 = env_get("WP_PORT", 3490);
    let num_workers: usize = env_get("WP_WORKERS", 6);
    let index_path: String =
        env_get_opt("WP_INDEX").unwrap_or_else(|| "index.html".to_string());

    let listen_fd = match bind_socket(port) {
        Ok(fd) => fd,
        Err(errno) => {
            eprintln!("failed to bind port {}: os error {}", port, errno);
            std::process::exit(1);
        }
    };

    let config = PoolConfig::default()
        .num_workers(num_workers)
        .thread_name_prefix("httpd-worker");
    let pool = TaskPool::new(config).expect("failed to create pool");

    kinfo!(
        "listening on port {} with {} workers, serving `{}`",
        port,
        num_workers,
        index_path
    );
    println!("server: waiting for connections...");

    loop {
        let (stream, peer) = match accept_client(listen_fd) {
            Ok(conn) => conn,
            Err(errno) => {
                kwarn!("accept: os error {}", errno);
                continue;
            }
        };
        println!("server: got connection from {}", peer);

        let index_path = index_path.clone();
        if let Err(e) = pool.push(move || handle_connection(stream, &index_path)) {
            kwarn!("push: {}", e);
        }
    }
}
