//! Static venue data: stadiums and the address lists geocoded around them.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::CatalogError;
use crate::services::{AddressItem, Coordinate, ServiceCategory};

/// A World Cup venue served by the app.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stadium {
    pub id: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub coordinate: Coordinate,
    /// IANA time zone, used to stamp reports in local time.
    pub tz: &'static str,
}

const STADIUMS: &[Stadium] = &[
    Stadium {
        id: "azteca",
        name: "Estadio Azteca",
        city: "Ciudad de México",
        coordinate: Coordinate::new(19.3028, -99.1507),
        tz: "America/Mexico_City",
    },
    Stadium {
        id: "bbva",
        name: "Estadio BBVA",
        city: "Monterrey, NL",
        coordinate: Coordinate::new(25.6696021, -100.2446),
        tz: "America/Monterrey",
    },
];

pub fn stadiums() -> &'static [Stadium] {
    STADIUMS
}

/// Case-insensitive lookup by id ("azteca", "bbva").
pub fn stadium(id: &str) -> Option<&'static Stadium> {
    let id = id.trim();
    STADIUMS.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

/// Which address lists to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    All,
    Azteca,
    Bbva,
}

impl Venue {
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "azteca" => Ok(Self::Azteca),
            "bbva" => Ok(Self::Bbva),
            other => Err(CatalogError::UnknownVenue(other.to_string())),
        }
    }

    pub fn addresses(&self) -> Vec<AddressItem> {
        match self {
            Self::All => default_addresses(),
            Self::Azteca => azteca_addresses(),
            Self::Bbva => bbva_addresses(),
        }
    }
}

type Entry = (&'static str, &'static str, ServiceCategory);

use crate::services::ServiceCategory::{BabySupplies, Clinic, Park, Pharmacy, Supermarket};

const AZTECA: &[Entry] = &[
    ("Coppel Tlalpan Azteca", "Calzada De Tlalpan 3375, Coyoacán, CDMX", Supermarket),
    ("Novag Infancia", "Calzada de Tlalpan 3417, Santa Úrsula Coapa, CDMX", Pharmacy),
    (
        "Hospital General Dr. Manuel Gea González",
        "Calz. de Tlalpan 4800, Belisario Domínguez Secc 16, Tlalpan, 14080 CDMX",
        Clinic,
    ),
    (
        "Shriners Children's México",
        "Av. del Imán 257, Pedregal de Sta Úrsula, Coyoacán, 04600 CDMX",
        Clinic,
    ),
    (
        "Parque Ecológico Santa Úrsula",
        "San Benito 347, Pedregal de Sta Úrsula, Coyoacán, 04600 CDMX",
        Park,
    ),
    (
        "Tianguis Santa Úrsula",
        "San Hermilo, Pedregal de Sta Úrsula, Coyoacán, 04600 CDMX",
        Supermarket,
    ),
    (
        "Mercado La Paz",
        "Calle Madero y Congreso, Guadalupe Victoria 97, Tlalpan Centro I, 14000 CDMX",
        Supermarket,
    ),
    (
        "Hospital Merlos",
        "Circuito Estadio Azteca 179, El Caracol, Coyoacán, 04739 CDMX",
        Clinic,
    ),
    (
        "Gran Sur",
        "Periférico Sur 5550, Pedregal de Carrasco, Coyoacán, 04700 CDMX",
        Supermarket,
    ),
    (
        "Hospital Tlalpan",
        "Prol. Bordo 24, Villa Lázaro Cárdenas, Tlalpan, 14370 CDMX",
        Clinic,
    ),
    (
        "Parque Novias",
        "Luis Murillo 36, Bosques de Tetlameya, Coyoacán, 04730 CDMX",
        Park,
    ),
    (
        "Parque Joyas",
        "Esmeralda s/n, Joyas del Pedregal, Coyoacán, 04660 CDMX",
        Park,
    ),
    (
        "Médica Sur - Urgencias",
        "Puente de Piedra 150, Pueblo Quieto, Tlalpan, 14050 CDMX",
        Clinic,
    ),
    (
        "IMSS Clínica 7 Huipulco",
        "Calz. de Tlalpan 4220, Huipulco, Tlalpan, 14370 CDMX",
        Clinic,
    ),
    (
        "Farmacia GYG",
        "Calz. de Tlalpan 4717, Toriello Guerra, Tlalpan, 14050 CDMX",
        Pharmacy,
    ),
    (
        "Farmacias del Ahorro Huipulco",
        "Cda. San Juan Bosco 2, Huipulco, Tlalpan, 14370 CDMX",
        Pharmacy,
    ),
    (
        "Farmacia San Celso",
        "C. San Celso 309, Pedregal de Sta Úrsula, Coyoacán, 04600 CDMX",
        Pharmacy,
    ),
    (
        "Food Market Huipulco",
        "Calz. Acoxpa y Calz. de Tlalpan, Huipulco, Tlalpan, 14370 CDMX",
        Supermarket,
    ),
];

const BBVA: &[Entry] = &[
    // Clinics and emergency care
    (
        "IMSS Clínica 4",
        "C. Mariano Matamoros 300, Centro de Guadalupe, 67100 Guadalupe, N.L.",
        Clinic,
    ),
    (
        "Cruz Verde Centro de Guadalupe",
        "Sin Nombre de Col 31, 67155 Guadalupe, N.L.",
        Clinic,
    ),
    (
        "ALFA Medical Center",
        "Independencia 410, Centro de Guadalupe, 67100 Monterrey, N.L.",
        Clinic,
    ),
    (
        "Cela Hospital",
        "P.º de las Américas 1881, Contry Sol, 67174 Guadalupe, N.L.",
        Clinic,
    ),
    (
        "Cruz Roja Guadalupe",
        "Av. Eloy Cavazos 2424, Las Villas, 67175 Guadalupe, N.L.",
        Clinic,
    ),
    // Pharmacies
    (
        "Farmacias Benavides (Eloy Cavazos)",
        "Av. Eloy Cavazos entre AV. QUETZALES Y ANACLETO ZAPATA, Privadas del Contry, 67170 Guadalupe, N.L.",
        Pharmacy,
    ),
    (
        "Farmacia Guadalajara (Quetzales)",
        "Quetzales 2902, Privadas del Contry, 67175 Guadalupe, N.L.",
        Pharmacy,
    ),
    (
        "Farmacia Guadalajara (Av. Las Torres)",
        "Av. Las Torres 627a-L, Sin Nombre de Col 33, 67140 Guadalupe, N.L.",
        Pharmacy,
    ),
    // Supermarkets and grocers
    (
        "Walmart",
        "Av. Eloy Cavazos 2051, Valles de Guadalupe, 67170 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "Soriana (Eloy Cavazos)",
        "Av. Eloy Cavazos 2000, Contry Sol 6to Sector, 67174 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "Bodega Aurrera Express (Fracc. Polanco)",
        "Gral. Ignacio Zaragoza 500, Centro, 67100 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "Abarrotes Venus",
        "Lic. Sebastián Lerdo de Tejada 102, Venus, 67144 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "Tiendas Six (La Quinta)",
        "La Quinta 2402, La Quinta, 67170 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "Super Sale La Pastora",
        "C. José Peón y Contreras, Bosques de La Pastora 1er Sector, 67176 Guadalupe, N.L.",
        Supermarket,
    ),
    (
        "MERKDON",
        "Calle Benito Juárez 802, Centro, 67100 Guadalupe, N.L.",
        Supermarket,
    ),
    // Parks
    (
        "Parque Zoológico La Pastora",
        "Av. Eloy Cavazos, Jardines de La Pastora, 67140 Guadalupe, N.L.",
        Park,
    ),
    (
        "Agua Monterrey Park",
        "Vereda Bosque La Pastora, Sin Nombre de Col 33, 67174 Guadalupe, N.L.",
        Park,
    ),
    // Nursing room outside the stadium
    (
        "Plaza Principal de Guadalupe (Zona de lactancia)",
        "Centro de Guadalupe, 67100 Guadalupe, N.L.",
        BabySupplies,
    ),
];

fn to_items(entries: &[Entry]) -> Vec<AddressItem> {
    entries
        .iter()
        .map(|(name, address, category)| AddressItem::new(name, address, *category))
        .collect()
}

pub fn azteca_addresses() -> Vec<AddressItem> {
    to_items(AZTECA)
}

pub fn bbva_addresses() -> Vec<AddressItem> {
    to_items(BBVA)
}

/// Both venues, BBVA first.
pub fn default_addresses() -> Vec<AddressItem> {
    let mut all = bbva_addresses();
    all.extend(azteca_addresses());
    all
}

/// Load an address list from a JSON array of `{name, address, category}`.
pub fn load_addresses(path: &Path) -> Result<Vec<AddressItem>, CatalogError> {
    let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
