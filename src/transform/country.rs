//! Country name to ISO 3166-1 alpha-2 code resolution.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Sentinel returned for a country name with no known mapping.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Display-name to alpha-2 code table.
///
/// Keys match the exact spelling used in the lodging feed (so "Ivory Coast"
/// rather than "Cote d'Ivoire"). The empty string maps to the empty string,
/// keeping "no country provided" distinct from "country not recognized".
static COUNTRY_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("Aland Islands", "AX"),
        ("Albania", "AL"),
        ("Algeria", "DZ"),
        ("American Samoa", "AS"),
        ("Andorra", "AD"),
        ("Angola", "AO"),
        ("Anguilla", "AI"),
        ("Antigua and Barbuda", "AG"),
        ("Argentina", "AR"),
        ("Armenia", "AM"),
        ("Aruba", "AW"),
        ("Australia", "AU"),
        ("Austria", "AT"),
        ("Azerbaijan", "AZ"),
        ("Bahamas", "BS"),
        ("Bahrain", "BH"),
        ("Bangladesh", "BD"),
        ("Barbados", "BB"),
        ("Belarus", "BY"),
        ("Belgium", "BE"),
        ("Belize", "BZ"),
        ("Benin", "BJ"),
        ("Bermuda", "BM"),
        ("Bhutan", "BT"),
        ("Bolivia", "BO"),
        ("Bonaire Saint Eustatius and Saba", "BQ"),
        ("Bosnia and Herzegovina", "BA"),
        ("Botswana", "BW"),
        ("Brazil", "BR"),
        ("British Virgin Islands", "VG"),
        ("Brunei", "BN"),
        ("Bulgaria", "BG"),
        ("Burkina Faso", "BF"),
        ("Burundi", "BI"),
        ("Cambodia", "KH"),
        ("Cameroon", "CM"),
        ("Canada", "CA"),
        ("Cape Verde", "CV"),
        ("Cayman Islands", "KY"),
        ("Chad", "TD"),
        ("Chile", "CL"),
        ("China", "CN"),
        ("Christmas Island", "CX"),
        ("Colombia", "CO"),
        ("Comoros", "KM"),
        ("Cook Islands", "CK"),
        ("Costa Rica", "CR"),
        ("Croatia", "HR"),
        ("Cuba", "CU"),
        ("Curacao", "CW"),
        ("Cyprus", "CY"),
        ("Czech Republic", "CZ"),
        ("Democratic Republic of the Congo", "CD"),
        ("Denmark", "DK"),
        ("Djibouti", "DJ"),
        ("Dominica", "DM"),
        ("Dominican Republic", "DO"),
        ("Ecuador", "EC"),
        ("Egypt", "EG"),
        ("El Salvador", "SV"),
        ("Equatorial Guinea", "GQ"),
        ("Eritrea", "ER"),
        ("Estonia", "EE"),
        ("Ethiopia", "ET"),
        ("Faroe Islands", "FO"),
        ("Fiji", "FJ"),
        ("Finland", "FI"),
        ("France", "FR"),
        ("French Guiana", "GF"),
        ("French Polynesia", "PF"),
        ("Gabon", "GA"),
        ("Gambia", "GM"),
        ("Georgia", "GE"),
        ("Germany", "DE"),
        ("Ghana", "GH"),
        ("Gibraltar", "GI"),
        ("Greece", "GR"),
        ("Greenland", "GL"),
        ("Grenada", "GD"),
        ("Guadeloupe", "GP"),
        ("Guam", "GU"),
        ("Guatemala", "GT"),
        ("Guernsey", "GG"),
        ("Guinea", "GN"),
        ("Guinea-Bissau", "GW"),
        ("Guyana", "GY"),
        ("Haiti", "HT"),
        ("Honduras", "HN"),
        ("Hong Kong", "HK"),
        ("Hungary", "HU"),
        ("Iceland", "IS"),
        ("India", "IN"),
        ("Indonesia", "ID"),
        ("Iraq", "IQ"),
        ("Ireland", "IE"),
        ("Isle of Man", "IM"),
        ("Israel", "IL"),
        ("Italy", "IT"),
        ("Ivory Coast", "CI"),
        ("Jamaica", "JM"),
        ("Japan", "JP"),
        ("Jersey", "JE"),
        ("Jordan", "JO"),
        ("Kazakhstan", "KZ"),
        ("Kenya", "KE"),
        ("Kiribati", "KI"),
        ("Kuwait", "KW"),
        ("Kyrgyzstan", "KG"),
        ("Laos", "LA"),
        ("Latvia", "LV"),
        ("Lebanon", "LB"),
        ("Lesotho", "LS"),
        ("Liberia", "LR"),
        ("Liechtenstein", "LI"),
        ("Lithuania", "LT"),
        ("Luxembourg", "LU"),
        ("Macao", "MO"),
        ("Macedonia", "MK"),
        ("Madagascar", "MG"),
        ("Malawi", "MW"),
        ("Malaysia", "MY"),
        ("Maldives", "MV"),
        ("Mali", "ML"),
        ("Malta", "MT"),
        ("Martinique", "MQ"),
        ("Mauritania", "MR"),
        ("Mauritius", "MU"),
        ("Mayotte", "YT"),
        ("Mexico", "MX"),
        ("Micronesia", "FM"),
        ("Moldova", "MD"),
        ("Monaco", "MC"),
        ("Mongolia", "MN"),
        ("Montenegro", "ME"),
        ("Montserrat", "MS"),
        ("Morocco", "MA"),
        ("Mozambique", "MZ"),
        ("Myanmar", "MM"),
        ("Namibia", "NA"),
        ("Nepal", "NP"),
        ("Netherlands", "NL"),
        ("New Caledonia", "NC"),
        ("New Zealand", "NZ"),
        ("Nicaragua", "NI"),
        ("Niger", "NE"),
        ("Nigeria", "NG"),
        ("Niue", "NU"),
        ("Norfolk Island", "NF"),
        ("Northern Mariana Islands", "MP"),
        ("Norway", "NO"),
        ("Oman", "OM"),
        ("Pakistan", "PK"),
        ("Palau", "PW"),
        ("Palestinian Territory", "PS"),
        ("Panama", "PA"),
        ("Papua New Guinea", "PG"),
        ("Paraguay", "PY"),
        ("Peru", "PE"),
        ("Philippines", "PH"),
        ("Poland", "PL"),
        ("Portugal", "PT"),
        ("Puerto Rico", "PR"),
        ("Qatar", "QA"),
        ("Republic of the Congo", "CG"),
        ("Reunion", "RE"),
        ("Romania", "RO"),
        ("Rwanda", "RW"),
        ("Saint Barthelemy", "BL"),
        ("Saint Kitts and Nevis", "KN"),
        ("Saint Lucia", "LC"),
        ("Saint Martin", "MF"),
        ("Saint Pierre and Miquelon", "PM"),
        ("Saint Vincent and the Grenadines", "VC"),
        ("Samoa", "WS"),
        ("San Marino", "SM"),
        ("Sao Tome and Principe", "ST"),
        ("Saudi Arabia", "SA"),
        ("Senegal", "SN"),
        ("Serbia", "RS"),
        ("Seychelles", "SC"),
        ("Sierra Leone", "SL"),
        ("Singapore", "SG"),
        ("Sint Maarten", "SX"),
        ("Slovakia", "SK"),
        ("Slovenia", "SI"),
        ("Solomon Islands", "SB"),
        ("South Africa", "ZA"),
        ("South Korea", "KR"),
        ("Spain", "ES"),
        ("Sri Lanka", "LK"),
        ("Sudan", "SD"),
        ("Suriname", "SR"),
        ("Svalbard and Jan Mayen", "SJ"),
        ("Swaziland", "SZ"),
        ("Sweden", "SE"),
        ("Switzerland", "CH"),
        ("Taiwan", "TW"),
        ("Tajikistan", "TJ"),
        ("Tanzania", "TZ"),
        ("Thailand", "TH"),
        ("Togo", "TG"),
        ("Tonga", "TO"),
        ("Trinidad and Tobago", "TT"),
        ("Tunisia", "TN"),
        ("Turkey", "TR"),
        ("Turkmenistan", "TM"),
        ("Turks and Caicos Islands", "TC"),
        ("U.S. Virgin Islands", "VI"),
        ("Uganda", "UG"),
        ("United Arab Emirates", "AE"),
        ("United Kingdom", "UK"),
        ("United States", "US"),
        ("United States Minor Outlying Islands", "UM"),
        ("Uruguay", "UY"),
        ("Uzbekistan", "UZ"),
        ("Vanuatu", "VU"),
        ("Vietnam", "VN"),
        ("Wallis and Futuna", "WF"),
        ("Zambia", "ZM"),
        ("Zimbabwe", "ZW"),
        ("", ""),
    ])
});

/// Resolve a country display name to its alpha-2 code.
///
/// Exact match only: lookups are case- and whitespace-sensitive. Names not
/// in the table resolve to [`UNKNOWN_COUNTRY`]; this is a normal outcome,
/// not an error.
pub fn resolve(country_name: &str) -> &'static str {
    COUNTRY_CODES
        .get(country_name)
        .copied()
        .unwrap_or(UNKNOWN_COUNTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_countries() {
        assert_eq!(resolve("France"), "FR");
        assert_eq!(resolve("Japan"), "JP");
        assert_eq!(resolve("Bonaire Saint Eustatius and Saba"), "BQ");
        assert_eq!(resolve("U.S. Virgin Islands"), "VI");
    }

    #[test]
    fn united_kingdom_uses_feed_code() {
        // The feed uses UK, not the ISO GB.
        assert_eq!(resolve("United Kingdom"), "UK");
    }

    #[test]
    fn unknown_names_resolve_to_sentinel() {
        assert_eq!(resolve("Atlantis"), UNKNOWN_COUNTRY);
        assert_eq!(resolve("france"), UNKNOWN_COUNTRY);
        assert_eq!(resolve(" France"), UNKNOWN_COUNTRY);
    }

    #[test]
    fn empty_name_resolves_to_empty_code() {
        assert_eq!(resolve(""), "");
    }
}
