//! # Echo server over a workpool
//!
//! One task per accepted connection; each task copies bytes back to the
//! client until EOF. A connection occupies its worker for its whole
//! lifetime, so at most `WP_WORKERS` clients are served concurrently and
//! further connections queue - the pool's documented behavior.
//!
//! ## Usage
//!
//!     cargo run -p workpool-echo --release
//!     # then: nc localhost 3491
//!
//! ## Environment Variables
//!
//! - `WP_PORT` - listen port (default 3491)
//! - `WP_WORKERS` - worker count (default 4)

use workpool::{env_get, kinfo, kwarn, PoolConfig, TaskPool};

use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::unix::io::FromRawFd;

const BACKLOG: i32 = 10;
const BUF_SIZE: usize = 4096;

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

/// Copy bytes back to the client until EOF. Runs on a pool worker.
fn handle_connection(mut stream: TcpStream) {
    let mut buf = [0u8; BUF_SIZE];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                kinfo!("disconnected by client");
                return;
            }
            Ok(n) => {
                if let Err(e) = stream.write_all(&buf[..n]) {
                    kwarn!("send: {}", e);
                    return;
                }
            }
            Err(e) => {
                kwarn!("recv: {}", e);
                return;
            }
        }
    }
}

fn main() {
    let port: u16 = env_get("WP_PORT", 3491);
    let num_workers: usize = env_get("WP_WORKERS", 4);

    let listen_fd = match bind_socket(port) {
        Ok(fd) => fd,
        Err(errno) => {
            eprintln!("failed to bind port {}: os error {}", port, errno);
            std::process::exit(1);
        }
    };

    let config = PoolConfig::default()
        .num_workers(num_workers)
        .thread_name_prefix("echo-worker");
    let pool = TaskPool::new(config).expect("failed to create pool");

    kinfo!("echo server on port {} with {} workers", port, num_workers);
    println!("server: waiting for connections...");

    loop {
        let client_fd = unsafe { libc::accept(listen_fd, std::ptr::null_mut(), std::ptr::null_mut()) };
        if client_fd < 0 {
            let errno = unsafe { *libc::__errno_location() };
            kwarn!("accept: os error {}", errno);
            continue;
        }

        // Safety: client_fd is a freshly accepted, unowned socket fd
        let stream = unsafe { TcpStream::from_raw_fd(client_fd) };
        if let Err(e) = pool.push(move || handle_connection(stream)) {
            kwarn!("push: {}", e);
        }
    }
}
