//! Wire structures of the INET_DIAG protocol.
//!
//! All structures mirror `<linux/inet_diag.h>` and `<linux/tcp.h>` and are
//! copied out of fetched bytes with `zerocopy`. Multi-byte fields are in host
//! byte order except where noted.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Socket identity (struct inet_diag_sockid).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagSockId {
    /// Source port, network byte order.
    pub idiag_sport: u16,
    /// Destination port, network byte order.
    pub idiag_dport: u16,
    /// Source address. Only the first 4 bytes are used for IPv4.
    pub idiag_src: [u8; 16],
    /// Destination address.
    pub idiag_dst: [u8; 16],
    /// Bound interface index.
    pub idiag_if: u32,
    /// Socket cookie.
    pub idiag_cookie: [u32; 2],
}

impl InetDiagSockId {
    /// Source port in host byte order.
    pub fn sport(&self) -> u16 {
        u16::from_be(self.idiag_sport)
    }

    /// Destination port in host byte order.
    pub fn dport(&self) -> u16 {
        u16::from_be(self.idiag_dport)
    }
}

/// Legacy request (struct inet_diag_req), used by `TCPDIAG_GETSOCK` and
/// `DCCPDIAG_GETSOCK`.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagReq {
    pub idiag_family: u8,
    pub idiag_src_len: u8,
    pub idiag_dst_len: u8,
    /// Requested extensions, `1 << (INET_DIAG_* - 1)`.
    pub idiag_ext: u8,
    pub id: InetDiagSockId,
    /// State filter, `1 << TCP_*`.
    pub idiag_states: u32,
    pub idiag_dbs: u32,
}

/// Request (struct inet_diag_req_v2), used by `SOCK_DIAG_BY_FAMILY`.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagReqV2 {
    pub sdiag_family: u8,
    pub sdiag_protocol: u8,
    pub idiag_ext: u8,
    pub pad: u8,
    pub idiag_states: u32,
    pub id: InetDiagSockId,
}

/// Response (struct inet_diag_msg).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagMsg {
    pub idiag_family: u8,
    pub idiag_state: u8,
    pub idiag_timer: u8,
    pub idiag_retrans: u8,
    pub id: InetDiagSockId,
    pub idiag_expires: u32,
    pub idiag_rqueue: u32,
    pub idiag_wqueue: u32,
    pub idiag_uid: u32,
    pub idiag_inode: u32,
}

/// Socket memory summary (struct inet_diag_meminfo).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagMeminfo {
    pub idiag_rmem: u32,
    pub idiag_wmem: u32,
    pub idiag_fmem: u32,
    pub idiag_tmem: u32,
}

/// TCP Vegas state (struct tcpvegas_info).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct TcpVegasInfo {
    pub tcpv_enabled: u32,
    pub tcpv_rttcnt: u32,
    pub tcpv_rtt: u32,
    pub tcpv_minrtt: u32,
}

/// DCTCP state (struct tcp_dctcp_info).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct TcpDctcpInfo {
    pub dctcp_enabled: u16,
    pub dctcp_ce_state: u16,
    pub dctcp_alpha: u32,
    pub dctcp_ab_ecn: u32,
    pub dctcp_ab_tot: u32,
}

/// BBR state (struct tcp_bbr_info).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct TcpBbrInfo {
    pub bbr_bw_lo: u32,
    pub bbr_bw_hi: u32,
    pub bbr_min_rtt: u32,
    pub bbr_pacing_gain: u32,
    pub bbr_cwnd_gain: u32,
}

/// Largest TCP-MD5 key.
pub const TCP_MD5SIG_MAXKEYLEN: usize = 80;

/// One TCP-MD5 key (struct tcp_diag_md5sig).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct TcpDiagMd5sig {
    pub tcpm_family: u8,
    pub tcpm_prefixlen: u8,
    pub tcpm_keylen: u16,
    /// Peer address, network byte order.
    pub tcpm_addr: [u8; 16],
    pub tcpm_key: [u8; TCP_MD5SIG_MAXKEYLEN],
}

impl TcpDiagMd5sig {
    /// Key bytes covered by `tcpm_keylen`, capped at the buffer size.
    pub fn key(&self) -> &[u8] {
        let len = (self.tcpm_keylen as usize).min(TCP_MD5SIG_MAXKEYLEN);
        &self.tcpm_key[..len]
    }
}

/// Bytecode operation header (struct inet_diag_bc_op).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagBcOp {
    pub code: u8,
    pub yes: u8,
    pub no: u16,
}

/// Address condition operand (struct inet_diag_hostcond). The address
/// follows the structure.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagHostcond {
    pub family: u8,
    pub prefix_len: u8,
    pub pad: [u8; 2],
    pub port: i32,
}

/// Mark condition operand (struct inet_diag_markcond).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct InetDiagMarkcond {
    pub mark: u32,
    pub mask: u32,
}

/// Response attribute types (INET_DIAG_*).
pub mod attr {
    pub const INET_DIAG_NONE: u16 = 0;
    pub const INET_DIAG_MEMINFO: u16 = 1;
    pub const INET_DIAG_INFO: u16 = 2;
    pub const INET_DIAG_VEGASINFO: u16 = 3;
    pub const INET_DIAG_CONG: u16 = 4;
    pub const INET_DIAG_TOS: u16 = 5;
    pub const INET_DIAG_TCLASS: u16 = 6;
    pub const INET_DIAG_SKMEMINFO: u16 = 7;
    pub const INET_DIAG_SHUTDOWN: u16 = 8;
    pub const INET_DIAG_DCTCPINFO: u16 = 9;
    pub const INET_DIAG_PROTOCOL: u16 = 10;
    pub const INET_DIAG_SKV6ONLY: u16 = 11;
    pub const INET_DIAG_LOCALS: u16 = 12;
    pub const INET_DIAG_PEERS: u16 = 13;
    pub const INET_DIAG_PAD: u16 = 14;
    pub const INET_DIAG_MARK: u16 = 15;
    pub const INET_DIAG_BBRINFO: u16 = 16;
    pub const INET_DIAG_CLASS_ID: u16 = 17;
    pub const INET_DIAG_MD5SIG: u16 = 18;
    pub const INET_DIAG_ULP_INFO: u16 = 19;
    pub const INET_DIAG_SK_BPF_STORAGES: u16 = 20;
    pub const INET_DIAG_CGROUP_ID: u16 = 21;
    pub const INET_DIAG_SOCKOPT: u16 = 22;

    /// Request attribute types (INET_DIAG_REQ_*).
    pub const INET_DIAG_REQ_NONE: u16 = 0;
    pub const INET_DIAG_REQ_BYTECODE: u16 = 1;
    pub const INET_DIAG_REQ_SK_BPF_STORAGES: u16 = 2;
    pub const INET_DIAG_REQ_PROTOCOL: u16 = 3;
}

/// Bytecode operation codes (INET_DIAG_BC_*).
pub mod bc {
    pub const INET_DIAG_BC_NOP: u8 = 0;
    pub const INET_DIAG_BC_JMP: u8 = 1;
    pub const INET_DIAG_BC_S_GE: u8 = 2;
    pub const INET_DIAG_BC_S_LE: u8 = 3;
    pub const INET_DIAG_BC_D_GE: u8 = 4;
    pub const INET_DIAG_BC_D_LE: u8 = 5;
    pub const INET_DIAG_BC_AUTO: u8 = 6;
    pub const INET_DIAG_BC_S_COND: u8 = 7;
    pub const INET_DIAG_BC_D_COND: u8 = 8;
    pub const INET_DIAG_BC_DEV_COND: u8 = 9;
    pub const INET_DIAG_BC_MARK_COND: u8 = 10;
    pub const INET_DIAG_BC_S_EQ: u8 = 11;
    pub const INET_DIAG_BC_D_EQ: u8 = 12;
    pub const INET_DIAG_BC_CGROUP_COND: u8 = 13;
}
