use hmem_core::dummy::DummyDevice;
use hmem_core::error::Result;
use hmem_core::hmem::{HmemContext, HmemIface, HmemMetrics};
use hmem_core::types::HmemIov;

/// A context together with a region of memory of a single kind to copy from and to.
pub struct CopyTarget {
    pub ctx: HmemContext,
    pub iface: HmemIface,
    pub region: HmemIov,
    // keeps host memory of the region alive
    _host: Vec<u8>,
}

impl CopyTarget {
    /// Host memory served by the system backend.
    pub fn system(size: usize) -> Result<Self> {
        let mut host = vec![0u8; size];
        let region = HmemIov::from(host.as_mut_slice());
        Ok(Self {
            ctx: HmemContext::builder().build()?,
            iface: HmemIface::System,
            region,
            _host: host,
        })
    }

    /// A simulated device registered as `iface`.
    pub fn dummy(iface: HmemIface, size: usize) -> Result<Self> {
        let dev = DummyDevice::new(size);
        Ok(Self {
            ctx: HmemContext::builder().backend(iface, dev.clone()).build()?,
            iface,
            region: dev.iov(0, size)?,
            _host: Vec::new(),
        })
    }

    /// A simulated device registered as `iface` behind the metrics middleware.
    pub fn dummy_metrics(iface: HmemIface, size: usize) -> Result<Self> {
        let dev = DummyDevice::new(size);
        Ok(Self {
            ctx: HmemContext::builder()
                .backend(iface, HmemMetrics::new(dev.clone()))
                .build()?,
            iface,
            region: dev.iov(0, size)?,
            _host: Vec::new(),
        })
    }

    /// A context with a simulated device registered for every device kind.
    ///
    /// The region belongs to the lowest device kind, so classification has to ask every kind.
    pub fn all_devices(size: usize) -> Result<Self> {
        let mut builder = HmemContext::builder();
        let mut region = None;
        for iface in HmemIface::ALL.iter().rev().filter(|iface| iface.is_device()) {
            let dev = DummyDevice::new(size);
            region = Some(dev.iov(0, size)?);
            builder = builder.backend(*iface, dev);
        }

        Ok(Self {
            ctx: builder.build()?,
            iface: HmemIface::Cuda,
            region: region.unwrap_or_default(),
            _host: Vec::new(),
        })
    }
}
