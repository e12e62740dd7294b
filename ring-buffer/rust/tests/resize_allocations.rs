use ringbuf::storage::ArrayStorage;
use ringbuf::RingBuffer;

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

// Only one dhat profiler may run per process, so everything lives in one test
#[test]
fn rebuilds_allocate_storage_once() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let mut rb = RingBuffer::<u64, ArrayStorage<u64>>::from_elements(64, 0..100).unwrap();

    // Warm up so lazily registered log callsites are not counted below
    rb.resize(65).unwrap();
    rb.remove_entry(&99, false);

    let before = dhat::HeapStats::get();
    rb.resize(16).unwrap();
    let after = dhat::HeapStats::get();
    dhat::assert_eq!(1, after.total_blocks - before.total_blocks);
    dhat::assert_eq!(16, rb.len());
    dhat::assert_eq!(Ok::<&u64, ringbuf::RingBufferError>(&36), rb.first());

    let before = dhat::HeapStats::get();
    rb.resize(1024).unwrap();
    let after = dhat::HeapStats::get();
    dhat::assert_eq!(1, after.total_blocks - before.total_blocks);
    dhat::assert_eq!(16, rb.len());

    let before = dhat::HeapStats::get();
    rb.remove_at(3).unwrap();
    let after = dhat::HeapStats::get();
    dhat::assert_eq!(1, after.total_blocks - before.total_blocks);

    let before = dhat::HeapStats::get();
    for i in 0..2048 {
        rb.append(i);
    }
    rb.drop_first().unwrap();
    rb.drop_last().unwrap();
    let after = dhat::HeapStats::get();
    dhat::assert_eq!(0, after.total_blocks - before.total_blocks);
}
