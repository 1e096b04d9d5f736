//! Winsock name resolution.

use std::ffi::CStr;
use std::mem::zeroed;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ptr;

use windows_sys::Win32::Networking::WinSock::{self as native, ADDRINFOA};

use crate::net::address::private::SocketAddress as _;
use crate::net::{AddressStorage, Candidate, Domain, Endpoint, Hints, Protocol, Type};
use crate::release::{OsOwned, Release};
use crate::windows::error::translate_addrinfo_error;
use crate::windows::init;
use crate::{Error, Result};

const MAX_HOST: usize = 1025;
const MAX_SERVICE: usize = 32;
const MAX_ADDRESS_TEXT: usize = 46;

unsafe impl Release for ADDRINFOA {
    unsafe fn release(ptr: *mut Self) {
        native::freeaddrinfo(ptr);
    }
}

pub(crate) fn getaddrinfo(
    host: Option<&CStr>,
    service: Option<&CStr>,
    hints: &Hints,
) -> Result<Vec<Candidate>> {
    init();
    // SAFETY: all zeroes is a valid `ADDRINFOA`.
    let mut raw_hints: ADDRINFOA = unsafe { zeroed() };
    raw_hints.ai_family = hints.domain.0;
    raw_hints.ai_socktype = hints.r#type.map_or(0, |t| t.0);
    raw_hints.ai_protocol = hints.protocol.map_or(0, |p| p.0);
    raw_hints.ai_flags = hints.flags.0;

    let mut list = ptr::null_mut();
    let res = unsafe {
        native::getaddrinfo(
            host.map_or(ptr::null(), |host| host.as_ptr().cast()),
            service.map_or(ptr::null(), |service| service.as_ptr().cast()),
            &raw_hints,
            &mut list,
        )
    };
    if res != 0 {
        return Err(translate_addrinfo_error(res));
    }
    // SAFETY: `getaddrinfo` succeeded, so we own the list.
    let Some(list) = (unsafe { OsOwned::from_raw(list) }) else {
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    let mut next = list.as_ptr().cast_const();
    // SAFETY: the list is valid until `list` is dropped.
    while let Some(info) = unsafe { next.as_ref() } {
        next = info.ai_next;
        if info.ai_addr.is_null() {
            continue;
        }
        let storage = unsafe { AddressStorage::from_ptr(info.ai_addr, info.ai_addrlen)? };
        let address = Endpoint::from_storage(&storage)?;
        let canonical_name = if info.ai_canonname.is_null() {
            None
        } else {
            let name = unsafe { CStr::from_ptr(info.ai_canonname.cast_const().cast()) };
            Some(name.to_string_lossy().into_owned())
        };
        candidates.push(Candidate::new(
            address,
            Type(info.ai_socktype),
            Protocol(info.ai_protocol),
            canonical_name,
        ));
    }
    Ok(candidates)
}

pub(crate) fn getnameinfo(address: &AddressStorage, flags: i32) -> Result<(String, String)> {
    init();
    let mut host = [0u8; MAX_HOST];
    let mut service = [0u8; MAX_SERVICE];
    let (ptr, length) = address.as_ptr();
    let res = unsafe {
        native::getnameinfo(
            ptr,
            length,
            host.as_mut_ptr(),
            host.len() as u32,
            service.as_mut_ptr(),
            service.len() as u32,
            flags,
        )
    };
    if res != 0 {
        return Err(translate_addrinfo_error(res));
    }
    Ok((c_string(&host), c_string(&service)))
}

/// Convert a NUL terminated buffer filled by Winsock.
fn c_string(buf: &[u8]) -> String {
    match CStr::from_bytes_until_nul(buf) {
        Ok(s) => s.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(buf).into_owned(),
    }
}

pub(crate) fn text_to_ip(domain: Domain, text: &CStr) -> Result<IpAddr> {
    init();
    match domain {
        Domain::IPV4 => {
            let mut raw = [0u8; 4];
            let res = unsafe {
                native::inet_pton(
                    i32::from(native::AF_INET),
                    text.as_ptr().cast(),
                    raw.as_mut_ptr().cast(),
                )
            };
            check_pton(res)?;
            Ok(IpAddr::V4(Ipv4Addr::from(raw)))
        }
        Domain::IPV6 => {
            let mut raw = [0u8; 16];
            let res = unsafe {
                native::inet_pton(
                    i32::from(native::AF_INET6),
                    text.as_ptr().cast(),
                    raw.as_mut_ptr().cast(),
                )
            };
            check_pton(res)?;
            Ok(IpAddr::V6(Ipv6Addr::from(raw)))
        }
        _ => Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED),
    }
}

fn check_pton(res: i32) -> Result<()> {
    match res {
        1 => Ok(()),
        0 => Err(Error::INVALID_ARGUMENT),
        _ => Err(Error::last_os_error()),
    }
}

pub(crate) fn ip_to_text(address: IpAddr) -> Result<String> {
    init();
    let mut buf = [0u8; MAX_ADDRESS_TEXT];
    let res = match address {
        IpAddr::V4(ip) => {
            let raw = ip.octets();
            unsafe {
                native::inet_ntop(
                    i32::from(native::AF_INET),
                    raw.as_ptr().cast(),
                    buf.as_mut_ptr(),
                    buf.len(),
                )
            }
        }
        IpAddr::V6(ip) => {
            let raw = ip.octets();
            unsafe {
                native::inet_ntop(
                    i32::from(native::AF_INET6),
                    raw.as_ptr().cast(),
                    buf.as_mut_ptr(),
                    buf.len(),
                )
            }
        }
    };
    if res.is_null() {
        return Err(Error::last_os_error());
    }
    Ok(c_string(&buf))
}

/// Only numeric scope ids are supported on Windows.
pub(crate) fn interface_index(_: &CStr) -> Result<u32> {
    Err(Error::NOT_FOUND)
}

pub(crate) fn interface_name(_: u32) -> Option<String> {
    None
}
