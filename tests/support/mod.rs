// Shared world server for integration tests, started once per test binary.

use std::net::{SocketAddr, TcpStream};
use std::sync::{OnceLock, mpsc};
use std::time::Duration;

static BASE_URL: OnceLock<String> = OnceLock::new();

/// Base `http://` URL of the shared server, starting it on first use.
pub fn ensure_server() -> &'static str {
    BASE_URL.get_or_init(|| {
        let addr = spawn_server();
        wait_until_accepting(addr);
        format!("http://{addr}")
    })
}

// The server gets its own thread and runtime so it outlives each `#[tokio::test]` runtime.
fn spawn_server() -> SocketAddr {
    let (addr_tx, addr_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("server runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral port");
            addr_tx
                .send(listener.local_addr().expect("local addr"))
                .expect("test thread waiting for address");
            world_server::run(listener).await.expect("world server failed");
        });
    });
    addr_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("server should publish its address")
}

fn wait_until_accepting(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("world server at {addr} never accepted connections");
}
