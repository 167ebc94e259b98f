use std::rc::Rc;
use std::time::Duration;
use tracing::{info, Level};
use transport::config::EndPointConfig;
use transport::end_point::EndPoint;
use transport::memory_pipe::MemoryPipe;
use transport::packet_header::PacketHeader;
use transport::time::MonotonicClock;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .try_init()
        .ok();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let clock = Rc::new(MonotonicClock::new());
    let (pipe_a, pipe_b) = MemoryPipe::pair(64 * 1024);
    let config = EndPointConfig::default_in_process();

    let mut a = EndPoint::new(Box::new(pipe_a), clock.clone(), &config)?;
    let mut b = EndPoint::new(Box::new(pipe_b), clock.clone(), &config)?;

    a.write(b"hello");
    a.flush()?;

    let mut buf = [0u8; 1500];
    for _ in 0..3 {
        let len = b.read(&mut buf);
        if len > 0 {
            info!("b received {:?}", std::str::from_utf8(&buf[PacketHeader::SERIALIZED_LEN..len])?);
            b.write(b"hello yourself");
        }
        b.flush()?;

        let len = a.read(&mut buf);
        if len > 0 {
            info!("a received {:?}", std::str::from_utf8(&buf[PacketHeader::SERIALIZED_LEN..len])?);
        }
        a.flush()?;

        std::thread::sleep(Duration::from_millis(16));
    }

    info!("a: smoothed rtt {} ms, {} packets outstanding", a.rtt_millis(), a.pending_send_count());
    info!("b: smoothed rtt {} ms, {} packets outstanding", b.rtt_millis(), b.pending_send_count());

    Ok(())
}
