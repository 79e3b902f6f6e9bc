// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Well known public nameservers.

use crate::nameserver::NameServer;

pub fn name_servers() -> Vec<(&'static str, NameServer)> {
    vec![
        ("Cloudflare", cloudflare::udp()),
        ("Google", google::udp()),
        ("OpenDNS", opendns::udp()),
        ("Quad9", quad9::udp()),
    ]
}

pub mod cloudflare {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServer;

    static IPV4: Ipv4Addr = Ipv4Addr::new(1, 1, 1, 1);

    pub fn udp() -> NameServer {
        NameServer::new((IPV4, 53))
    }
}

pub mod google {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServer;

    static IPV4: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

    pub fn udp() -> NameServer {
        NameServer::new((IPV4, 53))
    }
}

pub mod opendns {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServer;

    static IPV4: Ipv4Addr = Ipv4Addr::new(208, 67, 222, 222);

    pub fn udp() -> NameServer {
        NameServer::new((IPV4, 53))
    }
}

pub mod quad9 {
    use std::net::Ipv4Addr;

    use crate::nameserver::NameServer;

    static IPV4: Ipv4Addr = Ipv4Addr::new(9, 9, 9, 9);

    pub fn udp() -> NameServer {
        NameServer::new((IPV4, 53))
    }
}
