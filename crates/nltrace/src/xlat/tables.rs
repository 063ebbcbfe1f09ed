//! Name tables for the socket diagnostics protocol family.

use super::{NumFmt, Xlat};

/// Address families (`AF_*`).
pub static ADDRFAMS: Xlat = Xlat {
    dflt: "AF_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0, "AF_UNSPEC"),
        (1, "AF_UNIX"),
        (2, "AF_INET"),
        (3, "AF_AX25"),
        (4, "AF_IPX"),
        (5, "AF_APPLETALK"),
        (6, "AF_NETROM"),
        (7, "AF_BRIDGE"),
        (8, "AF_ATMPVC"),
        (9, "AF_X25"),
        (10, "AF_INET6"),
        (11, "AF_ROSE"),
        (12, "AF_DECnet"),
        (13, "AF_NETBEUI"),
        (14, "AF_SECURITY"),
        (15, "AF_KEY"),
        (16, "AF_NETLINK"),
        (17, "AF_PACKET"),
        (18, "AF_ASH"),
        (19, "AF_ECONET"),
        (20, "AF_ATMSVC"),
        (21, "AF_RDS"),
        (22, "AF_SNA"),
        (23, "AF_IRDA"),
        (24, "AF_PPPOX"),
        (25, "AF_WANPIPE"),
        (26, "AF_LLC"),
        (27, "AF_IB"),
        (28, "AF_MPLS"),
        (29, "AF_CAN"),
        (30, "AF_TIPC"),
        (31, "AF_BLUETOOTH"),
        (32, "AF_IUCV"),
        (33, "AF_RXRPC"),
        (34, "AF_ISDN"),
        (35, "AF_PHONET"),
        (36, "AF_IEEE802154"),
        (37, "AF_CAIF"),
        (38, "AF_ALG"),
        (39, "AF_NFC"),
        (40, "AF_VSOCK"),
        (41, "AF_KCM"),
        (42, "AF_QIPCRTR"),
        (43, "AF_SMC"),
        (44, "AF_XDP"),
        (45, "AF_MCTP"),
    ],
};

/// IP protocol numbers (`IPPROTO_*`).
pub static INET_PROTOCOLS: Xlat = Xlat {
    dflt: "IPPROTO_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0, "IPPROTO_IP"),
        (1, "IPPROTO_ICMP"),
        (2, "IPPROTO_IGMP"),
        (4, "IPPROTO_IPIP"),
        (6, "IPPROTO_TCP"),
        (8, "IPPROTO_EGP"),
        (12, "IPPROTO_PUP"),
        (17, "IPPROTO_UDP"),
        (22, "IPPROTO_IDP"),
        (29, "IPPROTO_TP"),
        (33, "IPPROTO_DCCP"),
        (41, "IPPROTO_IPV6"),
        (46, "IPPROTO_RSVP"),
        (47, "IPPROTO_GRE"),
        (50, "IPPROTO_ESP"),
        (51, "IPPROTO_AH"),
        (92, "IPPROTO_MTP"),
        (94, "IPPROTO_BEETPH"),
        (98, "IPPROTO_ENCAP"),
        (103, "IPPROTO_PIM"),
        (108, "IPPROTO_COMP"),
        (115, "IPPROTO_L2TP"),
        (132, "IPPROTO_SCTP"),
        (136, "IPPROTO_UDPLITE"),
        (137, "IPPROTO_MPLS"),
        (143, "IPPROTO_ETHERNET"),
        (255, "IPPROTO_RAW"),
        (262, "IPPROTO_MPTCP"),
    ],
};

/// TCP connection states.
pub static TCP_STATES: Xlat = Xlat {
    dflt: "TCP_???",
    fmt: NumFmt::Hex,
    entries: &[
        (1, "TCP_ESTABLISHED"),
        (2, "TCP_SYN_SENT"),
        (3, "TCP_SYN_RECV"),
        (4, "TCP_FIN_WAIT1"),
        (5, "TCP_FIN_WAIT2"),
        (6, "TCP_TIME_WAIT"),
        (7, "TCP_CLOSE"),
        (8, "TCP_CLOSE_WAIT"),
        (9, "TCP_LAST_ACK"),
        (10, "TCP_LISTEN"),
        (11, "TCP_CLOSING"),
        (12, "TCP_NEW_SYN_RECV"),
        (13, "TCP_BOUND_INACTIVE"),
    ],
};

/// TCP state filter bits (`1 << TCP_*`).
pub static TCP_STATE_FLAGS: Xlat = Xlat {
    dflt: "1<<TCP_???",
    fmt: NumFmt::Hex,
    entries: &[
        (1 << 1, "1<<TCP_ESTABLISHED"),
        (1 << 2, "1<<TCP_SYN_SENT"),
        (1 << 3, "1<<TCP_SYN_RECV"),
        (1 << 4, "1<<TCP_FIN_WAIT1"),
        (1 << 5, "1<<TCP_FIN_WAIT2"),
        (1 << 6, "1<<TCP_TIME_WAIT"),
        (1 << 7, "1<<TCP_CLOSE"),
        (1 << 8, "1<<TCP_CLOSE_WAIT"),
        (1 << 9, "1<<TCP_LAST_ACK"),
        (1 << 10, "1<<TCP_LISTEN"),
        (1 << 11, "1<<TCP_CLOSING"),
        (1 << 12, "1<<TCP_NEW_SYN_RECV"),
        (1 << 13, "1<<TCP_BOUND_INACTIVE"),
    ],
};

/// Attributes of an INET_DIAG response.
pub static INET_DIAG_ATTRS: Xlat = Xlat {
    dflt: "INET_DIAG_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0, "INET_DIAG_NONE"),
        (1, "INET_DIAG_MEMINFO"),
        (2, "INET_DIAG_INFO"),
        (3, "INET_DIAG_VEGASINFO"),
        (4, "INET_DIAG_CONG"),
        (5, "INET_DIAG_TOS"),
        (6, "INET_DIAG_TCLASS"),
        (7, "INET_DIAG_SKMEMINFO"),
        (8, "INET_DIAG_SHUTDOWN"),
        (9, "INET_DIAG_DCTCPINFO"),
        (10, "INET_DIAG_PROTOCOL"),
        (11, "INET_DIAG_SKV6ONLY"),
        (12, "INET_DIAG_LOCALS"),
        (13, "INET_DIAG_PEERS"),
        (14, "INET_DIAG_PAD"),
        (15, "INET_DIAG_MARK"),
        (16, "INET_DIAG_BBRINFO"),
        (17, "INET_DIAG_CLASS_ID"),
        (18, "INET_DIAG_MD5SIG"),
        (19, "INET_DIAG_ULP_INFO"),
        (20, "INET_DIAG_SK_BPF_STORAGES"),
        (21, "INET_DIAG_CGROUP_ID"),
        (22, "INET_DIAG_SOCKOPT"),
    ],
};

/// Attributes of an INET_DIAG request.
pub static INET_DIAG_REQ_ATTRS: Xlat = Xlat {
    dflt: "INET_DIAG_REQ_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0, "INET_DIAG_REQ_NONE"),
        (1, "INET_DIAG_REQ_BYTECODE"),
        (2, "INET_DIAG_REQ_SK_BPF_STORAGES"),
        (3, "INET_DIAG_REQ_PROTOCOL"),
    ],
};

/// Socket filter bytecode operations.
pub static INET_DIAG_BYTECODES: Xlat = Xlat {
    dflt: "INET_DIAG_BC_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0, "INET_DIAG_BC_NOP"),
        (1, "INET_DIAG_BC_JMP"),
        (2, "INET_DIAG_BC_S_GE"),
        (3, "INET_DIAG_BC_S_LE"),
        (4, "INET_DIAG_BC_D_GE"),
        (5, "INET_DIAG_BC_D_LE"),
        (6, "INET_DIAG_BC_AUTO"),
        (7, "INET_DIAG_BC_S_COND"),
        (8, "INET_DIAG_BC_D_COND"),
        (9, "INET_DIAG_BC_DEV_COND"),
        (10, "INET_DIAG_BC_MARK_COND"),
        (11, "INET_DIAG_BC_S_EQ"),
        (12, "INET_DIAG_BC_D_EQ"),
        (13, "INET_DIAG_BC_CGROUP_COND"),
    ],
};

/// Extension request bits (`1 << (INET_DIAG_* - 1)`).
pub static INET_DIAG_EXTENDED_FLAGS: Xlat = Xlat {
    dflt: "1<<INET_DIAG_???-1",
    fmt: NumFmt::Hex,
    entries: &[
        (1 << 0, "1<<(INET_DIAG_MEMINFO-1)"),
        (1 << 1, "1<<(INET_DIAG_INFO-1)"),
        (1 << 2, "1<<(INET_DIAG_VEGASINFO-1)"),
        (1 << 3, "1<<(INET_DIAG_CONG-1)"),
        (1 << 4, "1<<(INET_DIAG_TOS-1)"),
        (1 << 5, "1<<(INET_DIAG_TCLASS-1)"),
        (1 << 6, "1<<(INET_DIAG_SKMEMINFO-1)"),
        (1 << 7, "1<<(INET_DIAG_SHUTDOWN-1)"),
    ],
};

/// Socket shutdown direction bits.
pub static INET_DIAG_SHUTDOWN_FLAGS: Xlat = Xlat {
    dflt: "???_SHUTDOWN",
    fmt: NumFmt::Hex,
    entries: &[(1, "RCV_SHUTDOWN"), (2, "SEND_SHUTDOWN")],
};

/// Indices into the `SK_MEMINFO` counter array.
pub static SK_MEMINFO: Xlat = Xlat {
    dflt: "SK_MEMINFO_???",
    fmt: NumFmt::Dec,
    entries: &[
        (0, "SK_MEMINFO_RMEM_ALLOC"),
        (1, "SK_MEMINFO_RCVBUF"),
        (2, "SK_MEMINFO_WMEM_ALLOC"),
        (3, "SK_MEMINFO_SNDBUF"),
        (4, "SK_MEMINFO_FWD_ALLOC"),
        (5, "SK_MEMINFO_WMEM_QUEUED"),
        (6, "SK_MEMINFO_OPTMEM"),
        (7, "SK_MEMINFO_BACKLOG"),
        (8, "SK_MEMINFO_DROPS"),
    ],
};

/// Message types seen on a `NETLINK_SOCK_DIAG` socket.
pub static NL_SOCK_DIAG_TYPES: Xlat = Xlat {
    dflt: "NLMSG_???",
    fmt: NumFmt::Hex,
    entries: &[
        (1, "NLMSG_NOOP"),
        (2, "NLMSG_ERROR"),
        (3, "NLMSG_DONE"),
        (4, "NLMSG_OVERRUN"),
        (18, "TCPDIAG_GETSOCK"),
        (19, "DCCPDIAG_GETSOCK"),
        (20, "SOCK_DIAG_BY_FAMILY"),
        (21, "SOCK_DESTROY"),
    ],
};

/// Netlink message header flags.
pub static NETLINK_FLAGS: Xlat = Xlat {
    dflt: "NLM_F_???",
    fmt: NumFmt::Hex,
    entries: &[
        (0x01, "NLM_F_REQUEST"),
        (0x02, "NLM_F_MULTI"),
        (0x04, "NLM_F_ACK"),
        (0x08, "NLM_F_ECHO"),
        (0x10, "NLM_F_DUMP_INTR"),
        (0x20, "NLM_F_DUMP_FILTERED"),
        (0x300, "NLM_F_DUMP"),
        (0x100, "NLM_F_ROOT"),
        (0x200, "NLM_F_MATCH"),
        (0x400, "NLM_F_ATOMIC"),
    ],
};

/// Attribute type flag bits carried in `nla_type`.
pub static NLA_TYPE_FLAGS: Xlat = Xlat {
    dflt: "NLA_F_???",
    fmt: NumFmt::Hex,
    entries: &[(0x8000, "NLA_F_NESTED"), (0x4000, "NLA_F_NET_BYTEORDER")],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlat::XlatStyle;

    #[test]
    fn test_addrfams() {
        assert_eq!(ADDRFAMS.lookup(10), Some("AF_INET6"));
        assert_eq!(ADDRFAMS.lookup(45), Some("AF_MCTP"));
        assert_eq!(ADDRFAMS.lookup(46), None);
    }

    #[test]
    fn test_shutdown_flags() {
        let f = |v| INET_DIAG_SHUTDOWN_FLAGS.format_flags(v, XlatStyle::Verbose);
        assert_eq!(f(0), "0");
        assert_eq!(f(1), "0x1 /* RCV_SHUTDOWN */");
        assert_eq!(f(2), "0x2 /* SEND_SHUTDOWN */");
        assert_eq!(f(3), "0x3 /* RCV_SHUTDOWN|SEND_SHUTDOWN */");
        assert_eq!(f(4), "0x4 /* ???_SHUTDOWN */");
        assert_eq!(f(23), "0x17 /* RCV_SHUTDOWN|SEND_SHUTDOWN|0x14 */");
        assert_eq!(f(252), "0xfc /* ???_SHUTDOWN */");
    }

    #[test]
    fn test_netlink_dump_flag() {
        assert_eq!(NETLINK_FLAGS.format_flags(0x300, XlatStyle::Abbrev), "NLM_F_DUMP");
        assert_eq!(
            NETLINK_FLAGS.format_flags(0x301, XlatStyle::Abbrev),
            "NLM_F_REQUEST|NLM_F_DUMP"
        );
        assert_eq!(NETLINK_FLAGS.format_flags(0x100, XlatStyle::Abbrev), "NLM_F_ROOT");
    }

    #[test]
    fn test_sk_meminfo_unknown_index_is_decimal() {
        assert_eq!(SK_MEMINFO.format(9, XlatStyle::Abbrev), "9 /* SK_MEMINFO_??? */");
    }

    #[test]
    fn test_extended_flags() {
        assert_eq!(
            INET_DIAG_EXTENDED_FLAGS.format_flags(0x41, XlatStyle::Abbrev),
            "1<<(INET_DIAG_MEMINFO-1)|1<<(INET_DIAG_SKMEMINFO-1)"
        );
        assert_eq!(
            TCP_STATE_FLAGS.format_flags(1, XlatStyle::Abbrev),
            "0x1 /* 1<<TCP_??? */"
        );
    }
}
