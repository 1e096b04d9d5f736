//! Unix name resolution.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::mem::zeroed;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ptr;

use crate::net::address::private::SocketAddress as _;
use crate::net::{AddressStorage, Candidate, Domain, Endpoint, Hints, Protocol, Type};
use crate::release::{OsOwned, Release};
use crate::unix::error::translate_addrinfo_error;
use crate::{Error, Result};

/// Maximum length of a host name returned by `getnameinfo(3)`.
const MAX_HOST: usize = 1025;
/// Maximum length of a service name returned by `getnameinfo(3)`.
const MAX_SERVICE: usize = 32;
/// Maximum length of an IPv6 address in text, including the NUL byte.
const MAX_ADDRESS_TEXT: usize = 46;

// Not bound by the libc crate, part of the platform's libc.
unsafe extern "C" {
    fn inet_pton(af: c_int, src: *const c_char, dst: *mut c_void) -> c_int;
    fn inet_ntop(
        af: c_int,
        src: *const c_void,
        dst: *mut c_char,
        size: libc::socklen_t,
    ) -> *const c_char;
}

unsafe impl Release for libc::addrinfo {
    unsafe fn release(ptr: *mut Self) {
        libc::freeaddrinfo(ptr);
    }
}

pub(crate) fn getaddrinfo(
    host: Option<&CStr>,
    service: Option<&CStr>,
    hints: &Hints,
) -> Result<Vec<Candidate>> {
    // SAFETY: all zeroes is a valid `addrinfo`.
    let mut raw_hints: libc::addrinfo = unsafe { zeroed() };
    raw_hints.ai_family = hints.domain.0;
    raw_hints.ai_socktype = hints.r#type.map_or(0, |t| t.0);
    raw_hints.ai_protocol = hints.protocol.map_or(0, |p| p.0);
    raw_hints.ai_flags = hints.flags.0;

    let mut list = ptr::null_mut();
    let res = unsafe {
        libc::getaddrinfo(
            host.map_or(ptr::null(), CStr::as_ptr),
            service.map_or(ptr::null(), CStr::as_ptr),
            &raw_hints,
            &mut list,
        )
    };
    if res != 0 {
        return Err(translate_addrinfo_error(res));
    }
    // SAFETY: `getaddrinfo(3)` succeeded, so we own the list.
    let Some(list) = (unsafe { OsOwned::from_raw(list) }) else {
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    let mut next = list.as_ptr().cast_const();
    // SAFETY: the list is valid until `list` is dropped, which is after we
    // copied everything we need.
    while let Some(info) = unsafe { next.as_ref() } {
        next = info.ai_next;
        if info.ai_addr.is_null() {
            continue;
        }
        let storage = unsafe { AddressStorage::from_ptr(info.ai_addr, info.ai_addrlen as usize)? };
        let address = Endpoint::from_storage(&storage)?;
        let canonical_name = if info.ai_canonname.is_null() {
            None
        } else {
            let name = unsafe { CStr::from_ptr(info.ai_canonname) };
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

pub(crate) fn getnameinfo(address: &AddressStorage, flags: libc::c_int) -> Result<(String, String)> {
    let mut host: [c_char; MAX_HOST] = [0; MAX_HOST];
    let mut service: [c_char; MAX_SERVICE] = [0; MAX_SERVICE];
    let (ptr, length) = address.as_ptr();
    let res = unsafe {
        libc::getnameinfo(
            ptr,
            length,
            host.as_mut_ptr(),
            host.len() as _,
            service.as_mut_ptr(),
            service.len() as _,
            flags,
        )
    };
    if res != 0 {
        return Err(translate_addrinfo_error(res));
    }
    // SAFETY: `getnameinfo(3)` writes NUL terminated strings.
    let host = unsafe { CStr::from_ptr(host.as_ptr()) };
    let service = unsafe { CStr::from_ptr(service.as_ptr()) };
    Ok((
        host.to_string_lossy().into_owned(),
        service.to_string_lossy().into_owned(),
    ))
}

pub(crate) fn text_to_ip(domain: Domain, text: &CStr) -> Result<IpAddr> {
    match domain {
        Domain::IPV4 => {
            // SAFETY: all zeroes is a valid `in_addr`.
            let mut raw: libc::in_addr = unsafe { zeroed() };
            let res = unsafe {
                inet_pton(libc::AF_INET, text.as_ptr(), ptr::from_mut(&mut raw).cast())
            };
            check_pton(res)?;
            Ok(IpAddr::V4(Ipv4Addr::from(raw.s_addr.to_ne_bytes())))
        }
        Domain::IPV6 => {
            // SAFETY: all zeroes is a valid `in6_addr`.
            let mut raw: libc::in6_addr = unsafe { zeroed() };
            let res = unsafe {
                inet_pton(libc::AF_INET6, text.as_ptr(), ptr::from_mut(&mut raw).cast())
            };
            check_pton(res)?;
            Ok(IpAddr::V6(Ipv6Addr::from(raw.s6_addr)))
        }
        _ => Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED),
    }
}

fn check_pton(res: c_int) -> Result<()> {
    match res {
        1 => Ok(()),
        0 => Err(Error::INVALID_ARGUMENT),
        _ => Err(Error::last_os_error()),
    }
}

pub(crate) fn ip_to_text(address: IpAddr) -> Result<String> {
    let mut buf: [c_char; MAX_ADDRESS_TEXT] = [0; MAX_ADDRESS_TEXT];
    let res = match address {
        IpAddr::V4(ip) => {
            let raw = libc::in_addr {
                s_addr: u32::from_ne_bytes(ip.octets()),
            };
            unsafe {
                inet_ntop(
                    libc::AF_INET,
                    ptr::from_ref(&raw).cast(),
                    buf.as_mut_ptr(),
                    MAX_ADDRESS_TEXT as libc::socklen_t,
                )
            }
        }
        IpAddr::V6(ip) => {
            let raw = libc::in6_addr {
                s6_addr: ip.octets(),
            };
            unsafe {
                inet_ntop(
                    libc::AF_INET6,
                    ptr::from_ref(&raw).cast(),
                    buf.as_mut_ptr(),
                    MAX_ADDRESS_TEXT as libc::socklen_t,
                )
            }
        }
    };
    if res.is_null() {
        return Err(Error::last_os_error());
    }
    // SAFETY: `inet_ntop(3)` writes a NUL terminated string.
    let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(text.to_string_lossy().into_owned())
}

pub(crate) fn interface_index(name: &CStr) -> Result<u32> {
    match unsafe { libc::if_nametoindex(name.as_ptr()) } {
        0 => Err(Error::NOT_FOUND),
        index => Ok(index),
    }
}

pub(crate) fn interface_name(index: u32) -> Option<String> {
    let mut buf: [c_char; libc::IF_NAMESIZE] = [0; libc::IF_NAMESIZE];
    let res = unsafe { libc::if_indextoname(index, buf.as_mut_ptr()) };
    if res.is_null() {
        return None;
    }
    // SAFETY: `if_indextoname(3)` writes a NUL terminated string.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}
