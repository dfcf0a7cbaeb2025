use crate::dummy::DummyDevice;
use crate::error::{Error, ErrorKind, ErrorOrigin, PartialError, PartialResultExt, TransferredExt};
use crate::hmem::{HmemContext, HmemIface};
use crate::types::{iov_total_len, HmemIov};

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

fn device_ctx(iface: HmemIface, dev: &DummyDevice) -> HmemContext {
    HmemContext::builder()
        .backend(iface, dev.clone())
        .build()
        .unwrap()
}

/// Three segments of 4 bytes each, spread over the device with gaps in between.
fn spread_iov(dev: &DummyDevice) -> [HmemIov; 3] {
    [
        dev.iov(0x00, 4).unwrap(),
        dev.iov(0x10, 4).unwrap(),
        dev.iov(0x20, 4).unwrap(),
    ]
}

#[test]
fn system_roundtrip() {
    let ctx = HmemContext::system_only();

    let mut first = [0u8; 3];
    let mut second = [0u8; 5];
    let iov = [HmemIov::from(&mut first[..]), HmemIov::from(&mut second[..])];

    let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::System, 0, &src) }.unwrap();
    assert_eq!(done, 8);
    assert_eq!(first, [1, 2, 3]);
    assert_eq!(second, [4, 5, 6, 7, 8]);

    let mut out = [0u8; 8];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::System, 0) }.unwrap();
    assert_eq!(done, 8);
    assert_eq!(out, src);
}

#[test]
fn device_roundtrip_random() {
    let mut rng = XorShiftRng::seed_from_u64(0x1234_5678);
    let dev = DummyDevice::new(0x1000);
    let ctx = device_ctx(HmemIface::Ze, &dev);

    let iov = (0..16)
        .map(|i| dev.iov(i * 0x100, rng.gen_range(1, 0x100)).unwrap())
        .collect::<Vec<_>>();
    let total = iov_total_len(&iov);

    let src = (0..total).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Ze, 0, &src) }.unwrap();
    assert_eq!(done, total);

    let mut out = vec![0u8; total];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Ze, 0) }.unwrap();
    assert_eq!(done, total);
    assert_eq!(out, src);
}

#[test]
fn buffer_shorter_than_iov() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = spread_iov(&dev);

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Cuda, 0, &[9; 6]) }.unwrap();
    assert_eq!(done, 6);
    assert_eq!(dev.read_raw(0x00, 4).unwrap(), vec![9; 4]);
    assert_eq!(dev.read_raw(0x10, 4).unwrap(), vec![9, 9, 0, 0]);
    assert_eq!(dev.read_raw(0x20, 4).unwrap(), vec![0; 4]);
    // the last segment was never reached
    assert_eq!(dev.copy_calls(), 2);
}

#[test]
fn iov_shorter_than_buffer() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = spread_iov(&dev);
    dev.write_raw(0x00, &[1, 2, 3, 4]).unwrap();
    dev.write_raw(0x10, &[5, 6, 7, 8]).unwrap();
    dev.write_raw(0x20, &[9, 10, 11, 12]).unwrap();

    let mut out = [0xffu8; 16];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Cuda, 2) }.unwrap();
    assert_eq!(done, 10);
    assert_eq!(&out[..10], &[3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    // the tail of the buffer is left untouched
    assert_eq!(&out[10..], &[0xff; 6]);
}

#[test]
fn offset_skips_segments() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Rocr, &dev);
    let iov = spread_iov(&dev);

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Rocr, 5, &[1, 2, 3]) }.unwrap();
    assert_eq!(done, 3);
    assert_eq!(dev.read_raw(0x00, 4).unwrap(), vec![0; 4]);
    assert_eq!(dev.read_raw(0x10, 4).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(dev.read_raw(0x20, 4).unwrap(), vec![0; 4]);
    assert_eq!(dev.copy_calls(), 1);
}

#[test]
fn offset_spans_segments() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Rocr, &dev);
    let iov = spread_iov(&dev);

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Rocr, 6, &[1, 2, 3, 4]) }.unwrap();
    assert_eq!(done, 4);
    assert_eq!(dev.read_raw(0x10, 4).unwrap(), vec![0, 0, 1, 2]);
    assert_eq!(dev.read_raw(0x20, 4).unwrap(), vec![3, 4, 0, 0]);
}

#[test]
fn offset_equal_to_segment_len() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = [dev.iov(0x00, 4).unwrap(), dev.iov(0x10, 4).unwrap()];
    // marker right behind the first segment
    dev.write_raw(0x04, &[0xaa]).unwrap();

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Cuda, 4, &[1, 2, 3, 4]) }.unwrap();
    assert_eq!(done, 4);

    // the first segment was visited with an empty copy at its end
    assert_eq!(dev.copy_calls(), 2);
    assert_eq!(dev.read_raw(0x04, 1).unwrap(), vec![0xaa]);
    assert_eq!(dev.read_raw(0x00, 4).unwrap(), vec![0; 4]);
    assert_eq!(dev.read_raw(0x10, 4).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn offset_equal_to_total_len() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = [dev.iov(0x00, 4).unwrap(), dev.iov(0x10, 4).unwrap()];

    let mut out = [0u8; 4];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Cuda, 8) }.unwrap();
    assert_eq!(done, 0);
    assert_eq!(dev.copy_calls(), 1);
}

#[test]
fn offset_past_end() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = spread_iov(&dev);

    let mut out = [0u8; 4];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Cuda, 13) }.unwrap();
    assert_eq!(done, 0);
    assert_eq!(dev.copy_calls(), 0);
}

#[test]
fn empty_iov_and_buffer() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Ze, &dev);
    let iov = spread_iov(&dev);

    let done = unsafe { ctx.copy_to_hmem_iov(&[], HmemIface::Ze, 0, &[1, 2, 3]) }.unwrap();
    assert_eq!(done, 0);

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Ze, 0, &[]) }.unwrap();
    assert_eq!(done, 0);

    let mut out = [0u8; 0];
    let done = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Ze, 3) }.unwrap();
    assert_eq!(done, 0);

    assert_eq!(dev.copy_calls(), 0);
}

#[test]
fn zero_length_segments() {
    let dev = DummyDevice::new(0x100);
    let ctx = device_ctx(HmemIface::Ze, &dev);
    let iov = [
        dev.iov(0x00, 0).unwrap(),
        dev.iov(0x10, 2).unwrap(),
        dev.iov(0x20, 0).unwrap(),
        dev.iov(0x30, 2).unwrap(),
    ];

    let done = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Ze, 0, &[1, 2, 3, 4]) }.unwrap();
    assert_eq!(done, 4);
    assert_eq!(dev.read_raw(0x10, 2).unwrap(), vec![1, 2]);
    assert_eq!(dev.read_raw(0x30, 2).unwrap(), vec![3, 4]);
}

#[test]
fn failure_stops_copy() {
    let dev = DummyDevice::new(0x100).failing_copy_at(1);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = spread_iov(&dev);

    let res = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Cuda, 0, &[7; 12]) };
    assert_eq!(
        res,
        Err(PartialError::PartialCopy(
            4,
            Error(ErrorOrigin::Backend, ErrorKind::UnableToWriteMemory)
        ))
    );
    assert_eq!(res.transferred(), 4);
    assert_eq!(res.data_part(), Ok(4));

    // nothing after the failing segment is touched
    assert_eq!(dev.copy_calls(), 2);
    assert_eq!(dev.read_raw(0x00, 4).unwrap(), vec![7; 4]);
    assert_eq!(dev.read_raw(0x20, 4).unwrap(), vec![0; 4]);
}

#[test]
fn failure_on_first_segment() {
    let dev = DummyDevice::new(0x100).failing_copy_at(0);
    let ctx = device_ctx(HmemIface::Cuda, &dev);
    let iov = spread_iov(&dev);

    let mut out = [0u8; 8];
    let res = unsafe { ctx.copy_from_hmem_iov(&mut out, &iov, HmemIface::Cuda, 0) };
    assert_eq!(
        res,
        Err(PartialError::PartialCopy(
            0,
            Error(ErrorOrigin::Backend, ErrorKind::UnableToReadMemory)
        ))
    );
    assert_eq!(dev.copy_calls(), 1);
}

#[test]
fn uninitialized_iface() {
    let dev = DummyDevice::new(0x100).failing_init();
    let ctx = device_ctx(HmemIface::Rocr, &dev);
    let iov = spread_iov(&dev);

    let res = unsafe { ctx.copy_to_hmem_iov(&iov, HmemIface::Rocr, 0, &[1; 4]) };
    assert_eq!(
        res,
        Err(PartialError::Error(Error(
            ErrorOrigin::HmemIface,
            ErrorKind::Uninitialized
        )))
    );
    assert_eq!(res.transferred(), 0);
    assert_eq!(
        res.data(),
        Err(Error(ErrorOrigin::HmemIface, ErrorKind::Uninitialized))
    );
    assert_eq!(dev.copy_calls(), 0);
}
